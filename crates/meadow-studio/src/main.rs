use meadow_engine::logging::{init_logging, LoggingConfig};
use meadow_scene::{Experience, ExperienceConfig};

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = ExperienceConfig::default();
    log::info!(
        "meadow: {} blades, assets from '{}'",
        config.scene.field.instance_count,
        config.scene.asset_root.display()
    );

    Experience::new(config).run()
}
