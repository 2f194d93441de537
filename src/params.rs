/// Options for a contouring run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContourParams {
    /// Drop ring vertices that lie on the line through their neighbours.
    pub simplify_collinear: bool,
    /// Property under which features receive their sequential id.
    pub id_property: String,
}

impl Default for ContourParams {
    fn default() -> Self {
        Self {
            simplify_collinear: false,
            id_property: "id".to_owned(),
        }
    }
}
