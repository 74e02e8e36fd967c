// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CRD YAML Generator
//!
//! Generates Kubernetes CRD YAML files from the Rust types defined in src/crd/.
//! This ensures the YAML files in deploy/crds/ are always in sync with the Rust code.
//!
//! Usage:
//!   cargo run --bin crdgen
//!
//! Generated files will be written to deploy/crds/ with proper headers.

use kube::CustomResourceExt;
use silence_operator::crd::{v1alpha1, v1alpha2};
use std::fs;
use std::path::Path;

const GENERATED_HEADER: &str = "# Copyright (c) 2025 Erick Bourgeois, firestoned
# SPDX-License-Identifier: MIT
#
# This file is AUTO-GENERATED from src/crd/
# DO NOT EDIT MANUALLY - Run `cargo run --bin crdgen` to regenerate
#
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = Path::new("deploy/crds");
    fs::create_dir_all(output_dir)?;

    println!("Generating CRD YAML files from src/crd/...");

    generate_crd::<v1alpha1::Silence>("silences.monitoring.giantswarm.io.crd.yaml", output_dir)?;
    generate_crd::<v1alpha2::Silence>(
        "silences.observability.giantswarm.io.crd.yaml",
        output_dir,
    )?;
    generate_crd::<v1alpha2::RecurringSilence>(
        "recurringsilences.observability.giantswarm.io.crd.yaml",
        output_dir,
    )?;

    println!("✓ Successfully generated CRD YAML files in deploy/crds/");
    println!("\nNext steps:");
    println!("  1. Review the generated files");
    println!("  2. Deploy with: kubectl apply -f deploy/crds/");

    Ok(())
}

fn generate_crd<T>(filename: &str, output_dir: &Path) -> Result<(), Box<dyn std::error::Error>>
where
    T: CustomResourceExt,
{
    let crd = T::crd();
    let yaml = serde_yaml::to_string(&crd)?;
    let path = output_dir.join(filename);

    fs::write(&path, format!("{GENERATED_HEADER}{yaml}"))?;
    println!("  Generated {}", path.display());

    Ok(())
}
