//! Progress notifications for long imports.

/// Phases of a source import, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportPhase {
    Preparation,
    Parsing,
    Building,
    PostProcessing,
}

impl ImportPhase {
    pub fn name(self) -> &'static str {
        match self {
            ImportPhase::Preparation => "preparation",
            ImportPhase::Parsing => "parsing",
            ImportPhase::Building => "building",
            ImportPhase::PostProcessing => "post-processing",
        }
    }
}

/// Observer of an import run. All methods default to doing nothing.
pub trait ImportProgress {
    fn phase_started(&mut self, _phase: ImportPhase) {}

    fn roots_changed(&mut self, _count: usize) {}
}

/// The silent observer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ImportProgress for NoProgress {}
