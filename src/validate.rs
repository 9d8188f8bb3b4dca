//! Argument checks applied by the tool handlers before any request is built.
//! Each returns a caller-facing sentence on failure.

use crate::dispatch::ImageInput;

pub const MAX_COMPONENT_NAME_CHARS: usize = 50;
pub const MIN_DESCRIPTION_CHARS: usize = 10;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;
pub const MAX_EXISTING_COMPONENTS: usize = 50;
pub const MAX_INTEGRATION_CONTEXT_CHARS: usize = 500;
pub const MAX_IMAGES: usize = 5;
pub const MIN_IMAGE_DATA_CHARS: usize = 100;
pub const MAX_IMAGE_DESCRIPTION_CHARS: usize = 500;

/// Temperature must be finite and in [0.0, 2.0]. `None` means the client
/// default.
pub fn validate_temperature(temp: Option<f64>) -> Result<(), String> {
    if let Some(t) = temp
        && !(t.is_finite() && (0.0..=2.0).contains(&t))
    {
        return Err(
            "Temperature must be between 0 and 2 for optimal component generation".to_string(),
        );
    }
    Ok(())
}

pub fn validate_required(value: &str, what: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{what} is required."));
    }
    Ok(())
}

/// React component names: PascalCase, letters and digits, at most 50 chars.
pub fn validate_component_name(name: &str) -> Result<(), String> {
    validate_required(name, "Component name")?;
    if name.chars().count() > MAX_COMPONENT_NAME_CHARS {
        return Err(format!(
            "Component name must be {MAX_COMPONENT_NAME_CHARS} characters or less."
        ));
    }
    let mut chars = name.chars();
    let pascal = chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric());
    if !pascal {
        return Err(
            "Component name must start with uppercase letter and contain only letters and numbers (PascalCase)."
                .to_string(),
        );
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), String> {
    let n = description.trim().chars().count();
    if n < MIN_DESCRIPTION_CHARS {
        return Err(format!(
            "Description must be at least {MIN_DESCRIPTION_CHARS} characters for meaningful component generation."
        ));
    }
    if n > MAX_DESCRIPTION_CHARS {
        return Err(format!(
            "Description must be {MAX_DESCRIPTION_CHARS} characters or less."
        ));
    }
    Ok(())
}

pub fn validate_existing_components(components: &[String]) -> Result<(), String> {
    if components.len() > MAX_EXISTING_COMPONENTS {
        return Err(format!(
            "Maximum {MAX_EXISTING_COMPONENTS} existing components allowed."
        ));
    }
    Ok(())
}

pub fn validate_integration_context(context: Option<&str>) -> Result<(), String> {
    if let Some(c) = context
        && c.chars().count() > MAX_INTEGRATION_CONTEXT_CHARS
    {
        return Err(format!(
            "Integration context must be {MAX_INTEGRATION_CONTEXT_CHARS} characters or less."
        ));
    }
    Ok(())
}

pub fn validate_improvements(improvements: &[String]) -> Result<(), String> {
    if improvements.iter().all(|i| i.trim().is_empty()) {
        return Err("At least one improvement is required.".to_string());
    }
    Ok(())
}

fn is_base64(data: &str) -> bool {
    let body = data.trim_end_matches('=');
    !body.is_empty()
        && body
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
}

/// Shape checks only: count, base64 alphabet, a minimum length and the
/// description cap. Image kinds are checked by the client so the error can
/// name the image index.
pub fn validate_images(images: &[ImageInput]) -> Result<(), String> {
    if images.is_empty() {
        return Err("At least one image is required.".to_string());
    }
    if images.len() > MAX_IMAGES {
        return Err(format!(
            "Maximum {MAX_IMAGES} images allowed per request to avoid API limits."
        ));
    }

    for (i, image) in images.iter().enumerate() {
        let n = i + 1;
        let data = image.data.trim();
        if data.is_empty() {
            // reported by the client with its own wording
            continue;
        }
        if !is_base64(data) {
            return Err(format!("Image {n} data must be valid base64 encoded."));
        }
        if data.len() <= MIN_IMAGE_DATA_CHARS {
            return Err(format!(
                "Image {n} data appears too small to be a valid image."
            ));
        }
        if let Some(d) = &image.description
            && d.chars().count() > MAX_IMAGE_DESCRIPTION_CHARS
        {
            return Err(format!(
                "Image {n} description must be {MAX_IMAGE_DESCRIPTION_CHARS} characters or less."
            ));
        }
    }
    Ok(())
}
