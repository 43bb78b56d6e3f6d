use sketch_cli::{Difficulty, ScoringConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Scoring configuration serialization demo");
    println!("=========================================\n");

    // Demo 1: presets
    let default_config = ScoringConfig::default();
    let lenient_config = ScoringConfig {
        contour_tolerance: 5,
        keypoint_tolerance_ratio: 0.08,
        ..Default::default()
    };
    let strict_config = ScoringConfig {
        contour_tolerance: 2,
        edge_threshold: 40.0,
        keypoint_tolerance_ratio: 0.03,
        ..Default::default()
    };
    println!("Created 3 configurations:");
    for cfg in [&default_config, &lenient_config, &strict_config] {
        println!("  - {}", cfg.summary());
    }

    // Demo 2: JSON
    let json = lenient_config.to_json()?;
    println!("\nLenient config JSON (first 200 chars):");
    println!("{}", &json[..200.min(json.len())]);

    // Demo 3: TOML
    let toml = strict_config.to_toml()?;
    println!("\nStrict config TOML (first 300 chars):");
    println!("{}", &toml[..300.min(toml.len())]);

    // Demo 4: round trip through files
    let dir = std::env::temp_dir().join("sketch-config-demo");
    std::fs::create_dir_all(&dir)?;
    lenient_config.save_json(dir.join("lenient.json"))?;
    strict_config.save_toml(dir.join("strict.toml"))?;

    let loaded_json = ScoringConfig::load(dir.join("lenient.json"))?;
    let loaded_toml = ScoringConfig::load(dir.join("strict.toml"))?;
    loaded_json.validate()?;
    loaded_toml.validate()?;
    println!("\nLoaded and validated:");
    println!("  - from JSON: {}", loaded_json.summary());
    println!("  - from TOML: {}", loaded_toml.summary());

    // Demo 5: partial files fall back to defaults
    let partial = ScoringConfig::from_toml("contour_tolerance = 4\n")?;
    println!("\nPartial TOML keeps defaults: {}", partial.summary());

    println!("\nComponent weights per difficulty:");
    for difficulty in Difficulty::ALL {
        let w = difficulty.weights();
        println!(
            "  {difficulty:<6} contour {:.2}  keypoints {:.2}  local {:.2}",
            w.contour, w.keypoints, w.local
        );
    }

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}
