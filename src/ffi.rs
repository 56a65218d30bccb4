//! FFI interface for C/C++ hosts
//!
//! Markup goes in as a byte buffer, the request and the result travel as JSON.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use scraper::Selector;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::block::extract_block_with_schema;
use crate::dom::{block_element, parse_block};
use crate::schema::BlockSchema;

/// Request accepted by [`extract_block_ffi`]
#[derive(Debug, Clone, Deserialize)]
pub struct BlockExtractionRequest {
    pub block_name: String,
    pub schema: BlockSchema,
    /// Locates the block element in the markup; defaults to the first element
    #[serde(default)]
    pub selector: Option<String>,
}

/// Result returned by [`extract_block_ffi`]
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BlockExtractionResult {
    pub block: String,
    /// `null` when the schema matched nothing and generic extraction should be used
    pub data: Option<Map<String, Value>>,
}

/// Result struct returned to C++
/// Both pointers are owned by Rust and must be freed via free_extraction_result
#[repr(C)]
pub struct ExtractionResultFFI {
    /// JSON-serialized result (null-terminated)
    pub json_ptr: *mut c_char,
    /// Error message if extraction failed (null-terminated), or null on success
    pub error_ptr: *mut c_char,
}

/// Run schema extraction for one block of markup.
pub fn extract_block_from_html(
    html: &str,
    request: &BlockExtractionRequest,
) -> Result<BlockExtractionResult, String> {
    let fragment = parse_block(html);

    let block = match request.selector.as_deref() {
        Some(selector) => {
            let selector = Selector::parse(selector)
                .map_err(|e| format!("Invalid block selector `{selector}`: {e}"))?;
            fragment.select(&selector).next()
        }
        None => block_element(&fragment),
    };

    let data = block
        .and_then(|block| extract_block_with_schema(block, &request.schema, &request.block_name));

    Ok(BlockExtractionResult {
        block: request.block_name.clone(),
        data,
    })
}

/// Extract a block's structured data from HTML using a schema.
///
/// # Arguments
/// * `html_ptr` - Pointer to the block markup (UTF-8, not necessarily null-terminated)
/// * `html_len` - Length of the markup in bytes
/// * `request_json` - JSON-serialized BlockExtractionRequest (null-terminated)
///
/// # Returns
/// ExtractionResultFFI with either json_ptr set (success) or error_ptr set (failure)
///
/// # Safety
/// - `html_ptr` must point to valid memory of at least `html_len` bytes
/// - `request_json` must be a valid null-terminated C string
/// - Caller must free the result via `free_extraction_result`
#[no_mangle]
pub unsafe extern "C" fn extract_block_ffi(
    html_ptr: *const c_char,
    html_len: usize,
    request_json: *const c_char,
) -> ExtractionResultFFI {
    let outcome = html_from_raw(html_ptr, html_len)
        .and_then(|html| Ok((html, request_from_raw(request_json)?)))
        .and_then(|(html, request)| extract_block_from_html(html, &request))
        .and_then(|result| {
            serde_json::to_string(&result).map_err(|e| format!("Failed to serialize result: {e}"))
        });

    match outcome.and_then(|json| {
        CString::new(json).map_err(|_| "Result JSON contains null bytes".to_string())
    }) {
        Ok(json) => ExtractionResultFFI {
            json_ptr: json.into_raw(),
            error_ptr: ptr::null_mut(),
        },
        Err(msg) => make_error_result(&msg),
    }
}

/// Borrow the markup buffer as UTF-8; null or zero length is empty markup.
unsafe fn html_from_raw<'a>(html_ptr: *const c_char, html_len: usize) -> Result<&'a str, String> {
    if html_ptr.is_null() || html_len == 0 {
        return Ok("");
    }
    let bytes = std::slice::from_raw_parts(html_ptr as *const u8, html_len);
    std::str::from_utf8(bytes).map_err(|_| "Invalid UTF-8 in HTML content".to_string())
}

unsafe fn request_from_raw(request_json: *const c_char) -> Result<BlockExtractionRequest, String> {
    if request_json.is_null() {
        return Err("Request JSON is null".to_string());
    }
    let request_str = CStr::from_ptr(request_json)
        .to_str()
        .map_err(|_| "Invalid UTF-8 in request JSON".to_string())?;
    serde_json::from_str(request_str).map_err(|e| format!("Failed to parse request JSON: {e}"))
}

/// Free an ExtractionResultFFI returned by extract_block_ffi
///
/// # Safety
/// - `result` must have been returned by `extract_block_ffi`
/// - Must only be called once per result
#[no_mangle]
pub unsafe extern "C" fn free_extraction_result(result: ExtractionResultFFI) {
    if !result.json_ptr.is_null() {
        drop(CString::from_raw(result.json_ptr));
    }
    if !result.error_ptr.is_null() {
        drop(CString::from_raw(result.error_ptr));
    }
}

// Helper to create error result
fn make_error_result(msg: &str) -> ExtractionResultFFI {
    let error_ptr = CString::new(msg.replace('\0', " "))
        .map(CString::into_raw)
        .unwrap_or(ptr::null_mut());
    ExtractionResultFFI {
        json_ptr: ptr::null_mut(),
        error_ptr,
    }
}
