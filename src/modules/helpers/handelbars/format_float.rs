use handlebars::{Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, RenderError};

use crate::modules::helpers::handelbars::params::check_param_count;
use crate::modules::helpers::math::Math;

/// # number formatting helper
/// round a number to the given amount of decimals, `-` when there is no value
///
/// ### usage
/// ```handlebars
/// {{formatFloat average_position 2}}
/// ```
#[derive(Clone, Copy)]
pub struct FormatFloat;

impl HelperDef for FormatFloat {
    fn call<'reg: 'rc, 'rc>(
        &self,
        helper: &Helper,
        _: &Handlebars,
        _: &Context,
        _: &mut RenderContext,
        out: &mut dyn Output,
    ) -> HelperResult {
        check_param_count(helper, 2)?;

        let decimals = helper
            .param(1)
            .and_then(|param| param.value().as_u64())
            .ok_or_else(|| RenderError::new("formatFloat expects a number of decimals"))?;

        match helper.param(0).and_then(|param| param.value().as_f64()) {
            Some(number) => {
                let rounded = Math::round_float_to_n_decimals(number, decimals as i32);
                out.write(&format!("{rounded:.prec$}", prec = decimals as usize))?;
            }
            None => out.write("-")?,
        }

        Ok(())
    }
}
