/// Stages run by the training orchestrator, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum PipelineStep {
    /// Raw file to normalized table.
    Ingest,
    /// Normalized table to data quality report.
    Quality,
    /// Normalized table to model bundle and metrics.
    Train,
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_step_order() {
        let steps: Vec<_> = PipelineStep::iter().collect();
        assert_eq!(
            steps,
            vec![PipelineStep::Ingest, PipelineStep::Quality, PipelineStep::Train]
        );
        assert_eq!(PipelineStep::Quality.to_string(), "quality");
    }
}
