use chrono::Duration;
use handlebars::{Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, RenderError};

use crate::modules::helpers::duration::format_duration;
use crate::modules::helpers::handelbars::params::check_param_count;

/// # race time formatting helper
/// render a time given in nanoseconds as `H:MM:SS.ss` or `M:SS.ss`.
/// a missing time renders as `DNF`.
///
/// ### usage
/// ```handlebars
/// {{formatDuration time3_ns}}
/// ```
#[derive(Clone, Copy)]
pub struct FormatDuration;

impl HelperDef for FormatDuration {
    fn call<'reg: 'rc, 'rc>(
        &self,
        helper: &Helper,
        _: &Handlebars,
        _: &Context,
        _: &mut RenderContext,
        out: &mut dyn Output,
    ) -> HelperResult {
        check_param_count(helper, 1)?;
        let value = helper.param(0).map(|param| param.value());

        match value {
            None | Some(serde_json::Value::Null) => out.write("DNF")?,
            Some(value) => {
                let nanos = value.as_i64().ok_or_else(|| {
                    RenderError::new(format!("formatDuration expects nanoseconds, got {value}"))
                })?;
                out.write(&format_duration(Duration::nanoseconds(nanos)))?;
            }
        }

        Ok(())
    }
}
