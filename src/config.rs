//! Render-time knobs that sit outside the graph's own attributes.
//!
//! Grounded on the teacher's `config.rs` `RenderConfig`, minus its `unicode`
//! toggle — this core is ASCII-only end to end (spec non-goal: no
//! Unicode-width-aware rendering), so there is no charset to choose.

#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Draw arrowheads at all. When false, `END_*` flags still clip a
    /// character but never substitute an arrow glyph.
    pub arrows: bool,
    /// Hard cap on A* expansion steps per edge (§5: default 2,000,000).
    pub astar_step_budget: u64,
    /// Extra blank cells padded around the tight occupied bounding box
    /// before A* search (§4.5 "boundary rectangle").
    pub astar_pad: i64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            arrows: true,
            astar_step_budget: 2_000_000,
            astar_pad: 5,
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = RenderConfig::default();
        assert_eq!(cfg.astar_step_budget, 2_000_000);
        assert!(cfg.arrows);
    }
}
