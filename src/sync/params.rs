use super::apply::ValueSource;
use crate::client::Kwargs;
use crate::error::{ResolutionError, SyncError};
use crate::mapping::Locator;
use crate::schema::ParameterNode;

/// Resolves the parameters of one side of a mapping into call keywords.
///
/// A parameter with no correspondence feeding it is left out when optional
/// and is an error when required.
pub(crate) fn resolve_parameters(
    values: &ValueSource,
    source_side: bool,
    parameters: &[ParameterNode],
) -> Result<Kwargs, SyncError> {
    let mut kwargs = Kwargs::new();
    for param in parameters {
        if values.compiled.parameter_feed(source_side, &param.name).is_none() {
            if param.required {
                return Err(ResolutionError::UnfedParameter(param.name.clone()).into());
            }
            continue;
        }
        let locator = if source_side {
            Locator::SourceParameter(param.name.clone())
        } else {
            Locator::TargetParameter(param.name.clone())
        };
        kwargs.insert(param.name.clone(), values.resolve(&locator)?);
    }
    Ok(kwargs)
}
