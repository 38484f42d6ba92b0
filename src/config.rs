/// Tuning knobs read by [Pathfinder](crate::pathfinder::Pathfinder). Everything is a plain
/// setting; changing a field takes effect on the next request.
#[derive(Clone, Debug, PartialEq)]
pub struct PathfinderConfig {
    /// When false every request fails immediately.
    pub enabled: bool,
    /// Logs the rebuilt cost field and the resulting path at `debug` level.
    pub debug_render: bool,
    /// Runs the local and global shortening passes on found paths.
    pub try_shorten: bool,
    /// Scales the squared-distance heuristic. Larger values make the search greedier.
    pub heuristic_weight: f32,
    /// Search iterations allowed per frame before [is_ok_to_search](crate::pathfinder::Pathfinder::is_ok_to_search)
    /// reports the budget as spent.
    pub max_cost_per_frame: u32,
    /// Hard cap on iterations of a single search.
    pub max_loops: u32,
    /// How many rings of cells around an endpoint are searched for a clear node to snap to.
    pub snap_radius: i32,
    /// Skip the search when the endpoints lie on different connected components.
    pub reject_unreachable: bool,
}

impl Default for PathfinderConfig {
    fn default() -> PathfinderConfig {
        PathfinderConfig {
            enabled: true,
            debug_render: false,
            try_shorten: true,
            heuristic_weight: 1.0,
            max_cost_per_frame: 2000,
            max_loops: 500,
            snap_radius: 2,
            reject_unreachable: true,
        }
    }
}
