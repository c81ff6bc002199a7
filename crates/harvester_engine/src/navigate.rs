use std::time::Duration;

use engine_logging::{engine_debug, engine_info};

use crate::{DriverError, PageDriver};

const BUTTON_SELECTOR: &str = "button, [role=button]";
/// Buttons that move through the wizard rather than choose an option.
const NAVIGATION_WORDS: &[&str] = &["next", "back", "cancel", "skip", "close", "sign"];
const CLICK_PAUSE: Duration = Duration::from_millis(500);
const STEP_PAUSE: Duration = Duration::from_millis(800);

/// One screen of the wizard that leads to the table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WizardStep {
    pub label: String,
    /// Button texts to choose from, tried in order.
    pub options: Vec<String>,
    /// When no option matches, click the first visible non-navigation button.
    pub fallback_to_first: bool,
    /// Button texts that move to the next screen.
    pub advance: Vec<String>,
}

/// Click the first visible, enabled button whose text contains any of `texts`,
/// tried in order, ignoring case.
pub async fn click_button_by_text<D>(driver: &D, texts: &[String]) -> Result<bool, DriverError>
where
    D: PageDriver + ?Sized,
{
    if texts.is_empty() {
        return Ok(false);
    }
    let buttons = driver.query_selector_all(BUTTON_SELECTOR).await?;
    let mut labels = Vec::with_capacity(buttons.len());
    for button in &buttons {
        labels.push(label_of(driver, button).await?);
    }

    for text in texts {
        let needle = text.to_lowercase();
        for (button, label) in buttons.iter().zip(&labels) {
            if !label.contains(&needle) || !clickable(driver, button).await? {
                continue;
            }
            driver.click(button).await?;
            engine_debug!("Clicked button {label:?}");
            driver.wait_for(CLICK_PAUSE).await?;
            return Ok(true);
        }
    }
    Ok(false)
}

/// Choose an option on the current screen, then advance.
/// Returns whether anything was clicked.
pub async fn complete_step<D>(driver: &D, step: &WizardStep) -> Result<bool, DriverError>
where
    D: PageDriver + ?Sized,
{
    engine_info!("Wizard step: {}", step.label);
    let mut clicked = click_button_by_text(driver, &step.options).await?;

    if !clicked && step.fallback_to_first {
        for button in driver.query_selector_all(BUTTON_SELECTOR).await? {
            let label = label_of(driver, &button).await?;
            let is_navigation = NAVIGATION_WORDS.iter().any(|word| label.contains(word));
            if label.is_empty() || is_navigation || !clickable(driver, &button).await? {
                continue;
            }
            driver.click(&button).await?;
            engine_debug!("Picked default option {label:?}");
            driver.wait_for(Duration::from_millis(400)).await?;
            clicked = true;
            break;
        }
    }

    let advanced = click_button_by_text(driver, &step.advance).await?;
    driver.wait_for(STEP_PAUSE).await?;
    Ok(clicked || advanced)
}

/// Walk every step in order. A step that finds nothing to click is not fatal.
pub async fn run_wizard<D>(driver: &D, steps: &[WizardStep]) -> Result<usize, DriverError>
where
    D: PageDriver + ?Sized,
{
    let mut completed = 0;
    for step in steps {
        if complete_step(driver, step).await? {
            completed += 1;
        } else {
            engine_info!("Nothing to click for step {}", step.label);
        }
    }
    Ok(completed)
}

async fn label_of<D>(driver: &D, element: &D::Element) -> Result<String, DriverError>
where
    D: PageDriver + ?Sized,
{
    match driver.inner_text(element).await {
        Ok(text) => Ok(text.trim().to_lowercase()),
        Err(err) if err.is_transient() => Ok(String::new()),
        Err(err) => Err(err),
    }
}

async fn clickable<D>(driver: &D, element: &D::Element) -> Result<bool, DriverError>
where
    D: PageDriver + ?Sized,
{
    let state = async {
        Ok::<_, DriverError>(driver.is_visible(element).await? && driver.is_enabled(element).await?)
    };
    match state.await {
        Ok(ready) => Ok(ready),
        Err(err) if err.is_transient() => Ok(false),
        Err(err) => Err(err),
    }
}
