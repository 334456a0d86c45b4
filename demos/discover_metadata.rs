//! Fetches the OIDC metadata of every provider that declares `OAUTH2_SERVER_METADATA_URL` and
//! reports where it disagrees with the settings.
//!
//! Usage: `cargo run --example discover_metadata -- settings.json`.

// std
use std::env;
// crates.io
use color_eyre::{Result, eyre::eyre};
// self
use oauth2_login::{config::LoginConfig, discovery::MetadataRegistry, placeholder::ProcessEnv};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let path = env::args().nth(1).ok_or_else(|| eyre!("Pass the path of a settings file."))?;
	let config = LoginConfig::from_path(&path, &ProcessEnv)?;
	let registry = MetadataRegistry::new();

	for descriptor in config.providers() {
		if descriptor.endpoints.server_metadata.is_none() {
			println!("{}: no metadata URL configured.", descriptor.name);

			continue;
		}

		let metadata = registry.get_or_fetch(descriptor).await?;
		let mismatches = metadata.reconcile(descriptor);

		println!("{}: issuer {}.", descriptor.name, metadata.issuer);

		for mismatch in mismatches {
			println!("  {mismatch}");
		}
	}

	Ok(())
}
