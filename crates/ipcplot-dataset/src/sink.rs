use crate::dataset::PlotData;

/// Consumer of an assembled, labelled dataset (chart renderer, exporter).
///
/// A sink only ever sees complete data: failed or partial transfers never
/// reach it.
pub trait PresentationSink {
    type Error: std::error::Error + Send + Sync + 'static;

    fn present(&mut self, plot: &PlotData) -> Result<(), Self::Error>;
}

impl<F, E> PresentationSink for F
where
    F: FnMut(&PlotData) -> Result<(), E>,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn present(&mut self, plot: &PlotData) -> Result<(), E> {
        self(plot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        let mut sink = |plot: &PlotData| -> Result<(), std::io::Error> {
            seen.push(plot.labels().to_vec());
            Ok(())
        };
        let plot = PlotData::assemble(1, 1, vec![1.0], vec!["a".to_string()]).unwrap();
        sink.present(&plot).unwrap();
        assert_eq!(seen, vec![vec!["a".to_string()]]);
    }
}
