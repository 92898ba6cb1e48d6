#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    LoadingProject,
    CheckingCache,
    LoadingCachedResult,
    Compiling,
    FlyingMission,
    AgingBatteries,
    SavingResults,
    Completed,
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    /// Mission day, 1-based, once missions are being flown.
    pub day: Option<u32>,
    pub mission: Option<String>,
    pub message: Option<String>,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            day: None,
            mission: None,
            message,
        }
    }
}

impl RunStage {
    pub fn label(self) -> &'static str {
        match self {
            RunStage::LoadingProject => "Loading project",
            RunStage::CheckingCache => "Checking cache",
            RunStage::LoadingCachedResult => "Loading cached result",
            RunStage::Compiling => "Compiling",
            RunStage::FlyingMission => "Flying mission",
            RunStage::AgingBatteries => "Aging batteries",
            RunStage::SavingResults => "Saving results",
            RunStage::Completed => "Completed",
        }
    }
}
