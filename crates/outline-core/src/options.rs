use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::OutlineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlineOption {
    ConnectorLines,
    SelectedBranchOnly,
}

impl OutlineOption {
    pub const ALL: [OutlineOption; 2] = [
        OutlineOption::ConnectorLines,
        OutlineOption::SelectedBranchOnly,
    ];

    pub fn key(self) -> &'static str {
        match self {
            OutlineOption::ConnectorLines => "connector_lines",
            OutlineOption::SelectedBranchOnly => "selected_branch_only",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OutlineOption::ConnectorLines => "Show connector lines",
            OutlineOption::SelectedBranchOnly => "Show selected branch only",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("unknown outline option `{0}`")]
    Unknown(String),
}

impl FromStr for OutlineOption {
    type Err = OptionsError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|option| option.key() == key)
            .ok_or_else(|| OptionsError::Unknown(key.to_string()))
    }
}

/// One checkbox entry of the options menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionItem {
    pub option: OutlineOption,
    pub label: &'static str,
    pub checked: bool,
}

/// Checkbox state behind the outline's options menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineOptions {
    defaults: BTreeMap<OutlineOption, bool>,
    values: BTreeMap<OutlineOption, bool>,
}

impl OutlineOptions {
    pub fn new(config: &OutlineConfig) -> Self {
        let defaults = BTreeMap::from([
            (OutlineOption::ConnectorLines, config.connector_lines),
            (OutlineOption::SelectedBranchOnly, config.selected_branch_only),
        ]);
        Self {
            values: defaults.clone(),
            defaults,
        }
    }

    pub fn is_enabled(&self, option: OutlineOption) -> bool {
        self.values.get(&option).copied().unwrap_or(false)
    }

    pub fn items(&self) -> Vec<OptionItem> {
        OutlineOption::ALL
            .into_iter()
            .map(|option| OptionItem {
                option,
                label: option.label(),
                checked: self.is_enabled(option),
            })
            .collect()
    }

    /// Flip one option and return its new value.
    pub fn toggle(&mut self, option: OutlineOption) -> bool {
        let value = !self.is_enabled(option);
        self.values.insert(option, value);
        value
    }

    pub fn toggle_key(&mut self, key: &str) -> Result<bool, OptionsError> {
        Ok(self.toggle(key.parse()?))
    }

    pub fn reset_all(&mut self) {
        self.values = self.defaults.clone();
    }
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self::new(&OutlineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_and_reset() {
        let mut options = OutlineOptions::default();
        assert!(options.is_enabled(OutlineOption::ConnectorLines));
        assert!(!options.is_enabled(OutlineOption::SelectedBranchOnly));

        assert!(options.toggle(OutlineOption::SelectedBranchOnly));
        assert!(!options.toggle_key("connector_lines").unwrap());

        let checked: Vec<_> = options.items().iter().map(|item| item.checked).collect();
        assert_eq!(checked, [false, true]);

        options.reset_all();
        assert_eq!(options, OutlineOptions::default());
    }

    #[test]
    fn unknown_key_is_an_error() {
        let mut options = OutlineOptions::default();
        assert_eq!(
            options.toggle_key("zoom"),
            Err(OptionsError::Unknown("zoom".to_string()))
        );
    }
}
