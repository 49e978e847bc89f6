//! Static registry mapping logical field names to controls on the target form.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How a mapped control is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Select,
    Radio,
    Checkbox,
    Date,
    Email,
    Tel,
}

/// Connects one logical field to one addressable control on the target form.
#[derive(Debug, Clone)]
pub struct FieldMapping {
    pub name: String,
    pub locator: String,
    pub kind: FieldKind,
    pub required: bool,
    /// For checkbox-like controls on forms that encode "checked" as a value
    /// attribute instead of a boolean property.
    pub truthy_value: Option<String>,
}

impl FieldMapping {
    pub fn new(name: impl Into<String>, locator: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            locator: locator.into(),
            kind,
            required: false,
            truthy_value: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn truthy_value(mut self, value: impl Into<String>) -> Self {
        self.truthy_value = Some(value.into());
        self
    }
}

/// Ordered, immutable lookup table of field metadata.
///
/// The iteration order of [`all`](Self::all) is the fill order: the target
/// form reveals some controls only after earlier ones are filled, so the
/// sequence is fixed and deterministic. Safe to share across concurrent
/// fills without locking.
pub struct FieldRegistry {
    mappings: Vec<FieldMapping>,
    index: HashMap<String, usize>,
}

impl FieldRegistry {
    /// Build a registry, rejecting duplicate field names.
    pub fn new(mappings: Vec<FieldMapping>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for mapping in &mappings {
            if !seen.insert(mapping.name.as_str()) {
                return Err(Error::RegistryError(format!(
                    "duplicate field name: {}",
                    mapping.name
                )));
            }
        }
        Ok(Self::from_mappings(mappings))
    }

    fn from_mappings(mappings: Vec<FieldMapping>) -> Self {
        let index = mappings
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.clone(), i))
            .collect();
        Self { mappings, index }
    }

    /// All mappings, grouped by form section, in fill order.
    pub fn all(&self) -> &[FieldMapping] {
        &self.mappings
    }

    pub fn by_name(&self, name: &str) -> Option<&FieldMapping> {
        self.index.get(name).map(|&i| &self.mappings[i])
    }

    /// The subsequence of mappings with `required = true`, in fill order.
    pub fn required(&self) -> Vec<&FieldMapping> {
        self.mappings.iter().filter(|m| m.required).collect()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Field table for the A-28 representative/passport form.
    pub fn form_a28() -> Self {
        use FieldKind::*;

        let mut mappings = Vec::new();

        // Part 1: attorney / representative information
        mappings.extend([
            FieldMapping::new("online_account_number", "#attorney-online-account", Text),
            FieldMapping::new("attorney_last_name", "#attorney-last-name", Text).required(),
            FieldMapping::new("attorney_first_name", "#attorney-first-name", Text).required(),
            FieldMapping::new("attorney_middle_name", "#attorney-middle-name", Text),
            FieldMapping::new("street", "#attorney-street", Text).required(),
            FieldMapping::new("apt_ste_flr", "#attorney-apt-type", Select),
            FieldMapping::new("apt_ste_flr_number", "#attorney-apt-number", Text),
            FieldMapping::new("city", "#attorney-city", Text).required(),
            FieldMapping::new("state", "#attorney-state", Select).required(),
            FieldMapping::new("zip_code", "#attorney-zip", Text).required(),
            FieldMapping::new("country", "#attorney-country", Text),
            FieldMapping::new("daytime_phone", "#attorney-daytime-phone", Tel).required(),
            FieldMapping::new("mobile_phone", "#attorney-mobile-phone", Tel),
            FieldMapping::new("email", "#attorney-email", Email),
        ]);

        // Part 2: eligibility information
        mappings.extend([
            FieldMapping::new("is_attorney", "#eligibility-attorney", Checkbox)
                .truthy_value("checked"),
            FieldMapping::new("bar_number", "#eligibility-bar-number", Text),
            FieldMapping::new("licensing_authority", "#eligibility-licensing-authority", Text),
            FieldMapping::new("is_subject_to_orders", "input[name=\"subject-to-orders\"]", Radio),
            FieldMapping::new("law_firm_or_organization", "#eligibility-law-firm", Text),
            FieldMapping::new("is_accredited_rep", "#eligibility-accredited-rep", Checkbox)
                .truthy_value("checked"),
            FieldMapping::new("organization_name", "#eligibility-organization-name", Text),
            FieldMapping::new("accreditation_date", "#eligibility-accreditation-date", Date),
            FieldMapping::new(
                "is_associated_with_attorney",
                "#eligibility-associated-attorney",
                Checkbox,
            )
            .truthy_value("checked"),
            FieldMapping::new("is_law_student", "#eligibility-law-student", Checkbox)
                .truthy_value("checked"),
            FieldMapping::new("law_student_name", "#eligibility-law-student-name", Text),
        ]);

        // Part 3: passport / client information
        mappings.extend([
            FieldMapping::new("client_last_name", "#client-last-name", Text).required(),
            FieldMapping::new("client_first_name", "#client-first-name", Text).required(),
            FieldMapping::new("client_middle_name", "#client-middle-name", Text),
            FieldMapping::new("passport_number", "#passport-number", Text).required(),
            FieldMapping::new("country_of_issue", "#passport-country-issue", Text).required(),
            FieldMapping::new("date_of_issue", "#passport-date-issue", Date).required(),
            FieldMapping::new("date_of_expiration", "#passport-date-expiration", Date).required(),
            FieldMapping::new("date_of_birth", "#client-date-of-birth", Date).required(),
            FieldMapping::new("place_of_birth", "#client-place-of-birth", Text).required(),
            FieldMapping::new("sex", "input[name=\"client-sex\"]", Radio).required(),
            FieldMapping::new("nationality", "#client-nationality", Text).required(),
            FieldMapping::new("alien_number", "#client-alien-number", Text),
        ]);

        // Part 4: client consent
        mappings.extend([
            FieldMapping::new("notice_to_attorney", "#consent-notice-attorney", Checkbox)
                .truthy_value("checked"),
            FieldMapping::new("documents_to_attorney", "#consent-docs-attorney", Checkbox)
                .truthy_value("checked"),
            FieldMapping::new("documents_to_client", "#consent-docs-client", Checkbox)
                .truthy_value("checked"),
            FieldMapping::new("client_signature_date", "#client-signature-date", Date).required(),
        ]);

        // Part 5: attorney signature
        mappings.push(
            FieldMapping::new("attorney_signature_date", "#attorney-signature-date", Date)
                .required(),
        );

        Self::from_mappings(mappings)
    }
}
