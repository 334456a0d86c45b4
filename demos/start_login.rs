//! Loads a settings file, prints the login buttons, and walks one provider through the
//! authorization redirect and the post-login policy.
//!
//! Usage: `cargo run --example start_login -- settings.json [provider]`. Placeholders are read
//! from the process environment.

// std
use std::env;
// crates.io
use color_eyre::{Result, eyre::eyre};
use serde_json::json;
use url::Url;
// self
use oauth2_login::{config::LoginConfig, login::IdentityClaims, placeholder::ProcessEnv};

fn main() -> Result<()> {
	color_eyre::install()?;

	let mut args = env::args().skip(1);
	let path = args.next().ok_or_else(|| eyre!("Pass the path of a settings file."))?;
	let config = LoginConfig::from_path(&path, &ProcessEnv)?;

	println!("Authentication sources: {:?}.", config.sources().as_slice());

	for button in config.login_buttons() {
		println!("Login button `{}` labeled {:?}.", button.name, button.display_name);
	}

	let Some(descriptor) = args
		.next()
		.and_then(|name| config.provider(&name))
		.or_else(|| config.providers().first())
	else {
		println!("No OAuth2 provider is configured.");

		return Ok(());
	};
	let request =
		descriptor.authorization_request(Url::parse("https://localhost:5050/oauth2/authorize")?);

	println!("Send your user to {}.", request.authorize_url);

	// Simulate the callback: the state comes back and the host has decoded the claims.
	request.validate_state(&request.state)?;

	let claims = IdentityClaims::from_values(
		json!({ "email": "demo@example.com", "preferred_username": "demo" }),
		json!({}),
	)?;
	let policy = config
		.login_policy(&descriptor.name)
		.ok_or_else(|| eyre!("Provider `{}` disappeared.", descriptor.name))?;

	match policy.evaluate(&claims, false) {
		Ok(outcome) => println!("Login accepted: {outcome:?}."),
		Err(e) => println!("Login refused: {e}."),
	}

	Ok(())
}
