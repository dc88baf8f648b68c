use dungeon_defence_core::{Affordances, EntityKind, Notice, SidebarMetrics, StatusMessage};

/// Operator-facing widgets around the scene.
///
/// Everything here is output: the session never reads state back from the HUD.
pub trait Hud {
    /// Displays freshly fetched sidebar metrics.
    fn show_metrics(&mut self, metrics: &SidebarMetrics);

    /// Enables or disables the launch, reset and selection affordances.
    fn set_affordances(&mut self, affordances: Affordances);

    /// Displays the outcome banner.
    fn set_status(&mut self, status: StatusMessage);

    /// Marks an entity kind as selected in the panel.
    fn highlight_selection(&mut self, kind: EntityKind);

    /// Shows a notification.
    fn notify(&mut self, notice: &Notice);
}
