//! Configuration renderer: fills a textual template with run parameters to
//! produce the configuration file an external tool consumes.
//!
//! Substitution is pure text lookup over `{Name}` placeholders, matching the
//! format the codec's reference templates already use. `{{` and `}}` escape
//! literal braces. Supplying values the template never references is
//! harmless; a placeholder with no supplied value aborts the render before
//! anything is written, so a stale target file is never half-overwritten.

use crate::config::TemplateValues;
use crate::error::{CoreError, CoreResult};
use std::path::Path;

/// Renders `template` with `values` and writes the result to `target`.
pub fn render_template(
    template: &Path,
    values: &TemplateValues,
    target: &Path,
) -> CoreResult<()> {
    let text = std::fs::read_to_string(template).map_err(|source| CoreError::TemplateRead {
        path: template.to_path_buf(),
        source,
    })?;

    let rendered = render_str(&text, values, template)?;

    std::fs::write(target, rendered).map_err(|source| CoreError::ConfigWrite {
        path: target.to_path_buf(),
        source,
    })?;

    log::debug!(
        "Rendered {} -> {}",
        template.display(),
        target.display()
    );
    Ok(())
}

/// Substitutes placeholders in `text`. `template` is only used for error
/// reporting.
fn render_str(text: &str, values: &TemplateValues, template: &Path) -> CoreResult<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) if ch == '{' || ch == '\n' => {
                            return Err(CoreError::TemplateSyntax {
                                path: template.to_path_buf(),
                                detail: format!("unterminated placeholder '{{{name}'"),
                            });
                        }
                        Some(ch) => name.push(ch),
                        None => {
                            return Err(CoreError::TemplateSyntax {
                                path: template.to_path_buf(),
                                detail: format!("unterminated placeholder '{{{name}'"),
                            });
                        }
                    }
                }
                match values.get(&name) {
                    Some(value) => out.push_str(value),
                    None => {
                        return Err(CoreError::UnresolvedPlaceholder {
                            name,
                            path: template.to_path_buf(),
                        });
                    }
                }
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(CoreError::TemplateSyntax {
                        path: template.to_path_buf(),
                        detail: "single '}' outside a placeholder".to_string(),
                    });
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}
