/// Display-ready copy of an accepted backend analysis.
///
/// `raw_json` is the backend object re-serialized as pretty JSON, keys in the
/// order the backend sent them, so a saved report carries fields this client
/// does not know about.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisReport {
    pub source_url: String,
    pub summary: String,
    pub engine: Option<String>,
    pub root_cause: Option<String>,
    pub evidence: Vec<String>,
    pub recommendations: Vec<String>,
    pub code_patch: Option<String>,
    pub confidence: Option<f64>,
    pub detected_signatures: Vec<String>,
    pub raw_json: String,
}
