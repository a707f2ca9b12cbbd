//! Browser binding for the pedigree form
//!
//! Codes cross the boundary as their `s`/`d` text, payloads and reports as
//! JSON strings. Errors surface as JavaScript strings.

use wasm_bindgen::prelude::*;

use crate::engine::InbreedingEngine;
use crate::error::PedigreeError;
use crate::pedigree::Code;

fn to_js(error: PedigreeError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse(code: &str) -> Result<Code, JsValue> {
    Code::parse(code).map_err(to_js)
}

#[wasm_bindgen]
pub struct WasmEngine {
    inner: InbreedingEngine,
}

#[wasm_bindgen]
impl WasmEngine {
    /// Engine over an empty pedigree
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmEngine {
        WasmEngine {
            inner: InbreedingEngine::new(),
        }
    }

    /// Returns the edit report as JSON.
    #[wasm_bindgen(js_name = setName)]
    pub fn set_name(&mut self, code: &str, name: &str) -> Result<String, JsValue> {
        let report = self.inner.set_name(&parse(code)?, name);
        serde_json::to_string(&report).map_err(|e| to_js(e.into()))
    }

    /// Returns the edit report as JSON.
    #[wasm_bindgen(js_name = clearSubtree)]
    pub fn clear_subtree(&mut self, code: &str) -> Result<String, JsValue> {
        let report = self.inner.clear_subtree(&parse(code)?);
        serde_json::to_string(&report).map_err(|e| to_js(e.into()))
    }

    /// Merge a JSON payload onto `code`; returns the edit report as JSON.
    pub fn populate(&mut self, code: &str, payload: &str) -> Result<String, JsValue> {
        let report = self
            .inner
            .populate_from_data(&parse(code)?, payload)
            .map_err(to_js)?;
        serde_json::to_string(&report).map_err(|e| to_js(e.into()))
    }

    /// Breakdown for `code` (the subject when empty) as JSON.
    pub fn calculate(&self, code: &str) -> Result<String, JsValue> {
        let breakdown = self.inner.calculate_at(&parse(code)?).map_err(to_js)?;
        serde_json::to_string(&breakdown).map_err(|e| to_js(e.into()))
    }

    /// Text report for the subject.
    pub fn report(&self) -> String {
        self.inner.report()
    }

    /// Pretty-printed payload of the node at `code`.
    pub fn show(&self, code: &str) -> Result<String, JsValue> {
        self.inner.show(&parse(code)?).map_err(to_js)
    }

    /// Remove everything.
    pub fn reset(&mut self) {
        self.inner.reset();
    }
}

impl Default for WasmEngine {
    fn default() -> Self {
        Self::new()
    }
}
