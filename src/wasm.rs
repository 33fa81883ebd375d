use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn paginate_to_json(json: &str) -> Result<String, JsValue> {
    crate::paginate_json(json).map_err(|e| JsValue::from_str(&e.to_string()))
}
