mod clean;
mod scan;

pub use clean::run_clean;
pub use scan::run_scan;

use mdsweep_core::assets::ExtensionFilter;
use mdsweep_core::config::MdsweepConfig;
use mdsweep_core::reconcile::CleanOptions;

pub(crate) fn options_from_config(cfg: &MdsweepConfig) -> CleanOptions {
    CleanOptions {
        extensions: ExtensionFilter::with_extra(&cfg.extra_image_extensions),
    }
}
