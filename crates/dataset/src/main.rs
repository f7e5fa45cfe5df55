use dataset::{DatasetError, DatasetLayout, InspectConfig, Split, WasteClass};

fn main() -> anyhow::Result<()> {
    let config = InspectConfig::from_env();
    common::setup_logging(config.environment);

    tracing::info!(config = ?config, "Loaded configuration");

    let layout = DatasetLayout::new(&config.dataset_dir);
    let summary = match layout.count() {
        Ok(summary) => summary,
        Err(DatasetError::MissingRoot(root)) => {
            tracing::warn!(
                root = %root.display(),
                "Dataset root not found; set DATASET_DIR to the directory holding TRAIN/ and TEST/"
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    for split in Split::ALL {
        let counts = summary.split(split);
        tracing::info!(
            split = %split,
            organic = counts.organic,
            recyclable = counts.recyclable,
            total = counts.total(),
            "Split counts"
        );
    }
    tracing::info!(
        root = %layout.root().display(),
        total = summary.total(),
        "Dataset total"
    );

    let mut rng = fastrand::Rng::new();
    for class in WasteClass::ALL {
        let sample = layout.sample(Split::Train, class, config.sample_size, &mut rng)?;
        tracing::info!(
            split = %Split::Train,
            class = %class,
            class_index = class.index(),
            files = ?sample,
            "Sample images"
        );
    }

    Ok(())
}
