//! The per-field fill pipeline, submission guard, and result aggregation.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::driver::FormDriver;
use crate::error::{Error, Result};
use crate::page::Page;
use crate::record::{FieldValue, FormRecord};
use crate::registry::{FieldKind, FieldMapping, FieldRegistry};
use crate::report::{FieldOutcome, FillReport};
use crate::session::SessionManager;

/// Product of one pipeline run, before aggregation into a report.
#[derive(Debug)]
pub struct PipelineOutput {
    pub outcomes: Vec<FieldOutcome>,
    pub screenshot: Vec<u8>,
}

/// Transcribes one [`FormRecord`] into the live form, producing one
/// [`FieldOutcome`] per registry mapping, in registry order.
///
/// Per field the pipeline is a straight-line state machine: empty-value
/// policy, then locator resolution with a fixed fallback chain, then the
/// kind-specific fill strategy. One field's failure never aborts the run;
/// only navigation away from the form (the submission guard) does.
pub struct FillPipeline<'r> {
    registry: &'r FieldRegistry,
}

impl<'r> FillPipeline<'r> {
    pub fn new(registry: &'r FieldRegistry) -> Self {
        Self { registry }
    }

    /// Fill every mapped field from `record`, verify the page never left
    /// `form_url`, and capture the final page state.
    pub async fn run<D: FormDriver + ?Sized>(
        &self,
        driver: &D,
        record: &FormRecord,
        form_url: &str,
    ) -> Result<PipelineOutput> {
        let mut outcomes = Vec::with_capacity(self.registry.len());
        for mapping in self.registry.all() {
            let outcome = self.fill_field(driver, mapping, record.get(&mapping.name)).await;
            outcomes.push(outcome);
        }

        // Submission guard: a click handler or validation rule may have
        // navigated away or submitted the form behind our back.
        let current_url = driver.current_url().await?;
        if !current_url.contains(form_url) {
            return Err(Error::SubmissionDetected(current_url));
        }

        let screenshot = driver.screenshot().await?;
        Ok(PipelineOutput {
            outcomes,
            screenshot,
        })
    }

    async fn fill_field<D: FormDriver + ?Sized>(
        &self,
        driver: &D,
        mapping: &FieldMapping,
        value: Option<&FieldValue>,
    ) -> FieldOutcome {
        // Empty-value policy: no locator resolution for absent input.
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            return if mapping.required {
                FieldOutcome::failed(&mapping.name, None, "required field is empty")
            } else {
                FieldOutcome::skipped(&mapping.name, None, "empty optional field")
            };
        };
        let text = recorded_value(mapping, value);

        let selector = match self.resolve_locator(driver, mapping).await {
            Ok(Some(selector)) => selector,
            Ok(None) => {
                // A vanished control on an external form is soft: the form
                // may have drifted, so this is Skipped even when required.
                warn!(field = %mapping.name, locator = %mapping.locator, "locator not found");
                return FieldOutcome::skipped(&mapping.name, Some(text), "locator not found");
            }
            Err(e) => {
                return FieldOutcome::failed(&mapping.name, Some(text), e.to_string());
            }
        };

        match self.apply(driver, mapping, &selector, value).await {
            Ok(()) => {
                debug!(field = %mapping.name, selector = %selector, "filled");
                FieldOutcome::filled(&mapping.name, text)
            }
            Err(Error::Timeout(_)) => {
                warn!(field = %mapping.name, "timeout waiting for element");
                FieldOutcome::failed(&mapping.name, Some(text), "timeout waiting for element")
            }
            Err(e) => {
                warn!(field = %mapping.name, error = %e, "fill failed");
                FieldOutcome::failed(&mapping.name, Some(text), e.to_string())
            }
        }
    }

    /// Try the mapping's own locator, then the fallback chain derived from
    /// the field name; first match wins.
    async fn resolve_locator<D: FormDriver + ?Sized>(
        &self,
        driver: &D,
        mapping: &FieldMapping,
    ) -> Result<Option<String>> {
        if driver.element_exists(&mapping.locator).await? {
            return Ok(Some(mapping.locator.clone()));
        }
        for candidate in fallback_selectors(&mapping.name) {
            if driver.element_exists(&candidate).await? {
                debug!(field = %mapping.name, selector = %candidate, "resolved via fallback selector");
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    async fn apply<D: FormDriver + ?Sized>(
        &self,
        driver: &D,
        mapping: &FieldMapping,
        selector: &str,
        value: &FieldValue,
    ) -> Result<()> {
        match mapping.kind {
            FieldKind::Text | FieldKind::Email | FieldKind::Tel | FieldKind::Date => {
                driver.fill_text(selector, &value.as_text()).await
            }
            FieldKind::Select => driver.select_option(selector, &value.as_text()).await,
            FieldKind::Checkbox => {
                driver
                    .set_checked(selector, value.as_flag(mapping.truthy_value.as_deref()))
                    .await
            }
            FieldKind::Radio => driver.pick_radio(selector, &value.as_text()).await,
        }
    }
}

/// The value string recorded in a field's outcome.
///
/// For a checkbox the recorded value reflects the checked state actually
/// applied: the mapping's truthy token when one is configured and the box
/// was checked, otherwise "true"/"false". Re-interpreting the recorded
/// value under the same mapping yields the same state.
fn recorded_value(mapping: &FieldMapping, value: &FieldValue) -> String {
    match mapping.kind {
        FieldKind::Checkbox => {
            let checked = value.as_flag(mapping.truthy_value.as_deref());
            match (&mapping.truthy_value, checked) {
                (Some(token), true) => token.clone(),
                _ => checked.to_string(),
            }
        }
        _ => value.as_text(),
    }
}

/// Fallback selector chain for a field name, tried in order after the
/// mapping's own locator: attribute-name match, data-attribute match,
/// hyphenated-id match, placeholder-substring match.
pub fn fallback_selectors(field_name: &str) -> [String; 4] {
    let hyphenated = field_name.replace('_', "-");
    let spaced = field_name.replace('_', " ");
    [
        format!("[name=\"{field_name}\"]"),
        format!("[data-field=\"{field_name}\"]"),
        format!("#{hyphenated}"),
        format!("input[placeholder*=\"{spaced}\"]"),
    ]
}

/// Fill `record` into the form at `form_url` inside a fresh isolated
/// browser context, releasing the context on every exit path.
///
/// Never fails for recoverable conditions: the report is always a valid
/// value object, with operation-level failures surfaced as its top-level
/// `error`.
pub async fn fill_form(
    manager: &SessionManager,
    registry: &FieldRegistry,
    record: &FormRecord,
    form_url: &str,
) -> FillReport {
    let started = Instant::now();
    info!(form_url, "starting form fill");

    let session = match manager.acquire().await {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "session acquisition failed");
            return FillReport::aborted(e.to_string(), started.elapsed());
        }
    };

    let result = run_fill(session.page(), registry, record, form_url).await;

    if let Err(e) = manager.release(session).await {
        warn!(error = %e, "failed to release browser context");
    }

    match result {
        Ok(output) => {
            let report =
                FillReport::completed(output.outcomes, output.screenshot, started.elapsed());
            info!(
                filled = report.filled_fields.len(),
                skipped = report.skipped_fields.len(),
                failed = report.failed_fields.len(),
                duration_ms = report.duration_ms,
                "form fill completed"
            );
            report
        }
        Err(e) => {
            warn!(error = %e, "form fill aborted");
            FillReport::aborted(e.to_string(), started.elapsed())
        }
    }
}

async fn run_fill(
    page: &Page,
    registry: &FieldRegistry,
    record: &FormRecord,
    form_url: &str,
) -> Result<PipelineOutput> {
    page.goto(form_url).await?;
    page.wait_for_selector("form").await?;
    FillPipeline::new(registry).run(page, record, form_url).await
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::report::FieldStatus;

    const FORM_URL: &str = "https://forms.example/apply";

    /// Scripted in-memory form standing in for a live page.
    #[derive(Default)]
    struct ScriptedForm {
        state: Mutex<FormState>,
    }

    #[derive(Default)]
    struct FormState {
        selectors: HashSet<String>,
        options: HashMap<String, Vec<String>>,
        radio_groups: HashMap<String, Vec<String>>,
        filled: HashMap<String, String>,
        checked: HashMap<String, bool>,
        timeout_selectors: HashSet<String>,
        url: String,
        /// Selector that, once filled, navigates the page elsewhere.
        redirect_on: Option<(String, String)>,
    }

    impl ScriptedForm {
        fn filled_value(&self, selector: &str) -> Option<String> {
            self.state.lock().unwrap().filled.get(selector).cloned()
        }

        fn checked_state(&self, selector: &str) -> Option<bool> {
            self.state.lock().unwrap().checked.get(selector).copied()
        }
    }

    #[async_trait]
    impl FormDriver for ScriptedForm {
        async fn element_exists(&self, selector: &str) -> Result<bool> {
            let st = self.state.lock().unwrap();
            Ok(st.selectors.contains(selector)
                || st.options.contains_key(selector)
                || st.radio_groups.contains_key(selector))
        }

        async fn fill_text(&self, selector: &str, value: &str) -> Result<()> {
            let mut st = self.state.lock().unwrap();
            if st.timeout_selectors.contains(selector) {
                return Err(Error::Timeout(selector.to_string()));
            }
            if !st.selectors.contains(selector) {
                return Err(Error::ElementNotFound(selector.to_string()));
            }
            st.filled.insert(selector.to_string(), value.to_string());
            if let Some((trigger, target)) = st.redirect_on.clone() {
                if trigger == selector {
                    st.url = target;
                }
            }
            Ok(())
        }

        async fn select_option(&self, selector: &str, value: &str) -> Result<()> {
            let mut st = self.state.lock().unwrap();
            let Some(options) = st.options.get(selector) else {
                return Err(Error::ElementNotFound(selector.to_string()));
            };
            if !options.iter().any(|o| o == value) {
                return Err(Error::JsError(format!(
                    "No option with value {value} in {selector}"
                )));
            }
            st.filled.insert(selector.to_string(), value.to_string());
            Ok(())
        }

        async fn set_checked(&self, selector: &str, checked: bool) -> Result<()> {
            let mut st = self.state.lock().unwrap();
            if !st.selectors.contains(selector) {
                return Err(Error::ElementNotFound(selector.to_string()));
            }
            st.checked.insert(selector.to_string(), checked);
            Ok(())
        }

        async fn pick_radio(&self, group_selector: &str, value: &str) -> Result<()> {
            let mut st = self.state.lock().unwrap();
            let Some(values) = st.radio_groups.get(group_selector) else {
                return Err(Error::ElementNotFound(group_selector.to_string()));
            };
            if !values.iter().any(|v| v == value) {
                return Err(Error::ElementNotFound(format!(
                    "{group_selector}[value=\"{value}\"]"
                )));
            }
            st.filled
                .insert(group_selector.to_string(), value.to_string());
            Ok(())
        }

        async fn current_url(&self) -> Result<String> {
            Ok(self.state.lock().unwrap().url.clone())
        }

        async fn screenshot(&self) -> Result<Vec<u8>> {
            Ok(vec![0x89, 0x50, 0x4E, 0x47])
        }
    }

    fn test_registry() -> FieldRegistry {
        FieldRegistry::new(vec![
            FieldMapping::new("last_name", "#last-name", FieldKind::Text).required(),
            FieldMapping::new("first_name", "#first-name", FieldKind::Text).required(),
            FieldMapping::new("middle_name", "#middle-name", FieldKind::Text),
            FieldMapping::new("state", "#state", FieldKind::Select).required(),
            FieldMapping::new("newsletter", "#newsletter", FieldKind::Checkbox),
            FieldMapping::new("sex", "input[name=\"sex\"]", FieldKind::Radio).required(),
        ])
        .unwrap()
    }

    fn scripted_form() -> ScriptedForm {
        let mut st = FormState::default();
        for sel in ["#last-name", "#first-name", "#middle-name", "#newsletter"] {
            st.selectors.insert(sel.to_string());
        }
        st.options
            .insert("#state".to_string(), vec!["CA".into(), "NY".into()]);
        st.radio_groups.insert(
            "input[name=\"sex\"]".to_string(),
            vec!["M".into(), "F".into(), "X".into()],
        );
        st.url = FORM_URL.to_string();
        ScriptedForm {
            state: Mutex::new(st),
        }
    }

    fn record(registry: &FieldRegistry, pairs: &[(&str, FieldValue)]) -> FormRecord {
        let values = pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        FormRecord::new(registry, values).unwrap()
    }

    fn assert_partition(registry: &FieldRegistry, outcomes: &[FieldOutcome]) {
        let names: Vec<&str> = outcomes.iter().map(|o| o.field_name.as_str()).collect();
        let unique: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(names.len(), registry.len(), "one outcome per mapping");
        assert_eq!(unique.len(), names.len(), "no field appears twice");
        for mapping in registry.all() {
            assert!(unique.contains(mapping.name.as_str()), "no field dropped");
        }
    }

    #[tokio::test]
    async fn all_required_present_optionals_absent() {
        let registry = test_registry();
        let form = scripted_form();
        let rec = record(
            &registry,
            &[
                ("last_name", "Mayer".into()),
                ("first_name", "Jonas".into()),
                ("state", "CA".into()),
                ("sex", "M".into()),
            ],
        );

        let output = FillPipeline::new(&registry)
            .run(&form, &rec, FORM_URL)
            .await
            .unwrap();
        assert_partition(&registry, &output.outcomes);

        let report = FillReport::completed(output.outcomes, output.screenshot, Duration::ZERO);
        assert_eq!(report.filled_fields.len(), registry.required().len());
        assert_eq!(
            report.skipped_fields.len(),
            registry.len() - registry.required().len()
        );
        assert!(report.failed_fields.is_empty());
        assert!(report.success);
        assert_eq!(form.filled_value("#last-name").as_deref(), Some("Mayer"));
        assert_eq!(form.filled_value("#state").as_deref(), Some("CA"));
        assert_eq!(form.filled_value("input[name=\"sex\"]").as_deref(), Some("M"));
    }

    #[tokio::test]
    async fn empty_required_field_fails_without_aborting() {
        let registry = test_registry();
        let form = scripted_form();
        let rec = record(
            &registry,
            &[
                ("last_name", "".into()),
                ("first_name", "Jonas".into()),
                ("state", "CA".into()),
                ("sex", "M".into()),
            ],
        );

        let output = FillPipeline::new(&registry)
            .run(&form, &rec, FORM_URL)
            .await
            .unwrap();
        assert_partition(&registry, &output.outcomes);

        let report = FillReport::completed(output.outcomes, output.screenshot, Duration::ZERO);
        assert!(!report.success);
        assert_eq!(report.failed_fields.len(), 1);
        assert_eq!(report.failed_fields[0].field_name, "last_name");
        assert_eq!(
            report.failed_fields[0].error.as_deref(),
            Some("required field is empty")
        );
        // The other valid fields were still processed.
        assert!(report
            .filled_fields
            .iter()
            .any(|o| o.field_name == "first_name"));
        assert_eq!(form.filled_value("#first-name").as_deref(), Some("Jonas"));
    }

    #[tokio::test]
    async fn empty_optional_field_is_skipped_never_failed() {
        let registry = test_registry();
        let form = scripted_form();
        let rec = record(
            &registry,
            &[
                ("last_name", "Mayer".into()),
                ("first_name", "Jonas".into()),
                ("middle_name", "".into()),
                ("state", "CA".into()),
                ("sex", "M".into()),
            ],
        );

        let output = FillPipeline::new(&registry)
            .run(&form, &rec, FORM_URL)
            .await
            .unwrap();
        let skipped: Vec<_> = output
            .outcomes
            .iter()
            .filter(|o| o.status == FieldStatus::Skipped)
            .collect();
        assert!(skipped
            .iter()
            .any(|o| o.field_name == "middle_name"
                && o.error.as_deref() == Some("empty optional field")));
        assert!(!output
            .outcomes
            .iter()
            .any(|o| o.field_name == "middle_name" && o.status == FieldStatus::Failed));
    }

    #[tokio::test]
    async fn redirect_during_fill_aborts_with_submission_detected() {
        let registry = test_registry();
        let form = scripted_form();
        form.state.lock().unwrap().redirect_on = Some((
            "#first-name".to_string(),
            "https://forms.example/thank-you".to_string(),
        ));
        let rec = record(
            &registry,
            &[
                ("last_name", "Mayer".into()),
                ("first_name", "Jonas".into()),
                ("state", "CA".into()),
                ("sex", "M".into()),
            ],
        );

        let started = Instant::now();
        let err = FillPipeline::new(&registry)
            .run(&form, &rec, FORM_URL)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SubmissionDetected(_)));

        let report = FillReport::aborted(err.to_string(), started.elapsed());
        assert!(!report.success);
        assert!(report.screenshot.is_none());
        assert!(report
            .error
            .as_deref()
            .unwrap()
            .contains("Form submission detected"));
    }

    #[tokio::test]
    async fn timeout_downgrades_one_field() {
        let registry = test_registry();
        let form = scripted_form();
        form.state
            .lock()
            .unwrap()
            .timeout_selectors
            .insert("#last-name".to_string());
        let rec = record(
            &registry,
            &[
                ("last_name", "Mayer".into()),
                ("first_name", "Jonas".into()),
                ("state", "CA".into()),
                ("sex", "M".into()),
            ],
        );

        let output = FillPipeline::new(&registry)
            .run(&form, &rec, FORM_URL)
            .await
            .unwrap();
        let failed: Vec<_> = output
            .outcomes
            .iter()
            .filter(|o| o.status == FieldStatus::Failed)
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].field_name, "last_name");
        assert_eq!(failed[0].error.as_deref(), Some("timeout waiting for element"));
        // Later fields still ran.
        assert_eq!(form.filled_value("#first-name").as_deref(), Some("Jonas"));
    }

    #[tokio::test]
    async fn select_with_unknown_value_fails() {
        let registry = test_registry();
        let form = scripted_form();
        let rec = record(
            &registry,
            &[
                ("last_name", "Mayer".into()),
                ("first_name", "Jonas".into()),
                ("state", "ZZ".into()),
                ("sex", "M".into()),
            ],
        );

        let output = FillPipeline::new(&registry)
            .run(&form, &rec, FORM_URL)
            .await
            .unwrap();
        let state = output
            .outcomes
            .iter()
            .find(|o| o.field_name == "state")
            .unwrap();
        assert_eq!(state.status, FieldStatus::Failed);
        assert!(state.error.as_deref().unwrap().contains("No option"));
        assert!(form.filled_value("#state").is_none());
    }

    #[tokio::test]
    async fn missing_locator_skips_even_when_required() {
        let registry = test_registry();
        let form = scripted_form();
        form.state
            .lock()
            .unwrap()
            .radio_groups
            .remove("input[name=\"sex\"]");
        let rec = record(
            &registry,
            &[
                ("last_name", "Mayer".into()),
                ("first_name", "Jonas".into()),
                ("state", "CA".into()),
                ("sex", "M".into()),
            ],
        );

        let output = FillPipeline::new(&registry)
            .run(&form, &rec, FORM_URL)
            .await
            .unwrap();
        let sex = output
            .outcomes
            .iter()
            .find(|o| o.field_name == "sex")
            .unwrap();
        assert_eq!(sex.status, FieldStatus::Skipped);
        assert_eq!(sex.error.as_deref(), Some("locator not found"));
    }

    #[tokio::test]
    async fn fallback_selector_chain_resolves_renamed_controls() {
        let registry = FieldRegistry::new(vec![FieldMapping::new(
            "passport_number",
            "#passport-no",
            FieldKind::Text,
        )
        .required()])
        .unwrap();
        let mut st = FormState::default();
        // Primary locator missing; only the attribute-name fallback exists.
        st.selectors.insert("[name=\"passport_number\"]".to_string());
        st.url = FORM_URL.to_string();
        let form = ScriptedForm {
            state: Mutex::new(st),
        };
        let rec = record(&registry, &[("passport_number", "C01X0006H".into())]);

        let output = FillPipeline::new(&registry)
            .run(&form, &rec, FORM_URL)
            .await
            .unwrap();
        assert_eq!(output.outcomes[0].status, FieldStatus::Filled);
        assert_eq!(
            form.filled_value("[name=\"passport_number\"]").as_deref(),
            Some("C01X0006H")
        );
    }

    #[tokio::test]
    async fn checkbox_true_round_trips() {
        let registry = test_registry();
        let form = scripted_form();
        let rec = record(
            &registry,
            &[
                ("last_name", "Mayer".into()),
                ("first_name", "Jonas".into()),
                ("state", "CA".into()),
                ("sex", "M".into()),
                ("newsletter", true.into()),
            ],
        );

        let output = FillPipeline::new(&registry)
            .run(&form, &rec, FORM_URL)
            .await
            .unwrap();
        let newsletter = output
            .outcomes
            .iter()
            .find(|o| o.field_name == "newsletter")
            .unwrap();
        assert_eq!(newsletter.status, FieldStatus::Filled);
        assert_eq!(form.checked_state("#newsletter"), Some(true));
        // The recorded value reapplies to the same checked state.
        let recorded = FieldValue::Text(newsletter.value.clone().unwrap());
        assert!(recorded.as_flag(None));
    }

    #[tokio::test]
    async fn checkbox_with_truthy_token_round_trips() {
        let registry = FieldRegistry::new(vec![FieldMapping::new(
            "is_attorney",
            "#is-attorney",
            FieldKind::Checkbox,
        )
        .truthy_value("checked")])
        .unwrap();
        let mut st = FormState::default();
        st.selectors.insert("#is-attorney".to_string());
        st.url = FORM_URL.to_string();
        let form = ScriptedForm {
            state: Mutex::new(st),
        };
        let rec = record(&registry, &[("is_attorney", true.into())]);

        let output = FillPipeline::new(&registry)
            .run(&form, &rec, FORM_URL)
            .await
            .unwrap();
        let outcome = &output.outcomes[0];
        assert_eq!(outcome.status, FieldStatus::Filled);
        assert_eq!(form.checked_state("#is-attorney"), Some(true));
        // The token is recorded, so the recorded value re-interprets to the
        // same checked state under the same mapping.
        assert_eq!(outcome.value.as_deref(), Some("checked"));
        let recorded = FieldValue::Text(outcome.value.clone().unwrap());
        assert!(recorded.as_flag(Some("checked")));

        // A flag that was never set records "false" and stays unchecked.
        let form = ScriptedForm {
            state: Mutex::new(FormState::default()),
        };
        form.state
            .lock()
            .unwrap()
            .selectors
            .insert("#is-attorney".to_string());
        form.state.lock().unwrap().url = FORM_URL.to_string();
        let rec = record(&registry, &[("is_attorney", false.into())]);
        let output = FillPipeline::new(&registry)
            .run(&form, &rec, FORM_URL)
            .await
            .unwrap();
        assert_eq!(output.outcomes[0].value.as_deref(), Some("false"));
        assert_eq!(form.checked_state("#is-attorney"), Some(false));
        assert!(!FieldValue::Text("false".into()).as_flag(Some("checked")));
    }

    #[tokio::test]
    async fn concurrent_fills_never_cross_contaminate() {
        let registry = test_registry();
        let form_a = scripted_form();
        let form_b = scripted_form();
        let rec_a = record(
            &registry,
            &[
                ("last_name", "Mayer".into()),
                ("first_name", "Jonas".into()),
                ("state", "CA".into()),
                ("sex", "M".into()),
            ],
        );
        let rec_b = record(
            &registry,
            &[
                ("last_name", "Okafor".into()),
                ("first_name", "Amara".into()),
                ("state", "NY".into()),
                ("sex", "F".into()),
            ],
        );

        let pipeline = FillPipeline::new(&registry);
        for _ in 0..50 {
            let (out_a, out_b) = tokio::join!(
                pipeline.run(&form_a, &rec_a, FORM_URL),
                pipeline.run(&form_b, &rec_b, FORM_URL),
            );
            let out_a = out_a.unwrap();
            let out_b = out_b.unwrap();

            assert_eq!(form_a.filled_value("#last-name").as_deref(), Some("Mayer"));
            assert_eq!(form_b.filled_value("#last-name").as_deref(), Some("Okafor"));
            let value_of = |out: &PipelineOutput, name: &str| {
                out.outcomes
                    .iter()
                    .find(|o| o.field_name == name)
                    .and_then(|o| o.value.clone())
            };
            assert_eq!(value_of(&out_a, "state").as_deref(), Some("CA"));
            assert_eq!(value_of(&out_b, "state").as_deref(), Some("NY"));
            assert_eq!(value_of(&out_a, "sex").as_deref(), Some("M"));
            assert_eq!(value_of(&out_b, "sex").as_deref(), Some("F"));
        }
    }

    #[test]
    fn fallback_chain_order_is_fixed() {
        let chain = fallback_selectors("passport_number");
        assert_eq!(
            chain,
            [
                "[name=\"passport_number\"]".to_string(),
                "[data-field=\"passport_number\"]".to_string(),
                "#passport-number".to_string(),
                "input[placeholder*=\"passport number\"]".to_string(),
            ]
        );
    }
}
