use crate::payload::DEFAULT_MAX_BODY_SIZE;
use crate::DiResult;
use serde::{Deserialize, Serialize};

/// Container settings, usually read from a TOML file
///
/// # Examples
///
/// ```
/// use hero_di::DiSettings;
///
/// let settings = DiSettings::from_toml_str("param_start_index = 1").unwrap();
/// assert_eq!(settings.param_start_index, 1);
/// assert!(settings.builtins);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiSettings {
	/// Index of the first path parameter handlers consume
	pub param_start_index: usize,
	/// Body size limit for payload dependencies, in bytes
	pub max_body_size: usize,
	/// Register the request, its parts, the session and the time
	pub builtins: bool,
}

impl Default for DiSettings {
	fn default() -> Self {
		Self {
			param_start_index: 0,
			max_body_size: DEFAULT_MAX_BODY_SIZE,
			builtins: true,
		}
	}
}

impl DiSettings {
	pub fn from_toml_str(source: &str) -> DiResult<Self> {
		Ok(toml::from_str(source)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::DiError;
	use rstest::rstest;

	#[rstest]
	fn empty_document_uses_defaults() {
		assert_eq!(DiSettings::from_toml_str("").unwrap(), DiSettings::default());
	}

	#[rstest]
	fn reads_every_field() {
		// Arrange
		let source = r#"
			param_start_index = 2
			max_body_size = 1024
			builtins = false
		"#;

		// Act
		let settings = DiSettings::from_toml_str(source).unwrap();

		// Assert
		assert_eq!(
			settings,
			DiSettings {
				param_start_index: 2,
				max_body_size: 1024,
				builtins: false,
			}
		);
	}

	#[rstest]
	fn invalid_document_is_a_settings_error() {
		let result = DiSettings::from_toml_str("param_start_index = \"one\"");
		assert!(matches!(result, Err(DiError::Settings(_))));
	}
}
