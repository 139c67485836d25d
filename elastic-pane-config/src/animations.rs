use knuffel::errors::DecodeError;

use crate::utils::{expect_only_children, parse_arg_node, reject_properties_and_children};
use crate::FloatOrInt;

#[derive(knuffel::Decode, Debug, Clone, PartialEq)]
pub struct Animations {
    #[knuffel(child)]
    pub off: bool,
    #[knuffel(child, unwrap(argument), default = FloatOrInt(1.))]
    pub slowdown: FloatOrInt<0, { i32::MAX }>,
    #[knuffel(child, default)]
    pub transition: TransitionAnim,
}

impl Default for Animations {
    fn default() -> Self {
        Self {
            off: false,
            slowdown: FloatOrInt(1.),
            transition: Default::default(),
        }
    }
}

/// Defaults for `moveTo`-style transitions that don't specify their own duration or curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionAnim {
    pub off: bool,
    pub duration_ms: u32,
    pub curve: Curve,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Linear,
    EaseOutQuad,
    EaseOutCubic,
    EaseOutExpo,
    EaseOutBack,
    CubicBezier(f64, f64, f64, f64),
}

impl Default for TransitionAnim {
    fn default() -> Self {
        Self {
            off: false,
            duration_ms: 300,
            curve: Curve::EaseOutQuad,
        }
    }
}

impl<S> knuffel::Decode<S> for TransitionAnim
where
    S: knuffel::traits::ErrorSpan,
{
    fn decode_node(
        node: &knuffel::ast::SpannedNode<S>,
        ctx: &mut knuffel::decode::Context<S>,
    ) -> Result<Self, DecodeError<S>> {
        expect_only_children(node, ctx);

        let default = Self::default();
        let mut off = false;
        let mut duration_ms = None;
        let mut curve = None;

        for child in node.children() {
            match &**child.node_name {
                "off" => {
                    knuffel::decode::check_flag_node(child, ctx);
                    if off {
                        ctx.emit_error(DecodeError::unexpected(
                            &child.node_name,
                            "node",
                            "duplicate node `off`, single node expected",
                        ));
                    } else {
                        off = true;
                    }
                }
                "duration-ms" => {
                    if duration_ms.is_some() {
                        ctx.emit_error(DecodeError::unexpected(
                            &child.node_name,
                            "node",
                            "duplicate node `duration-ms`, single node expected",
                        ));
                    }

                    duration_ms = Some(parse_arg_node("duration-ms", child, ctx)?);
                }
                "curve" => {
                    if curve.is_some() {
                        ctx.emit_error(DecodeError::unexpected(
                            &child.node_name,
                            "node",
                            "duplicate node `curve`, single node expected",
                        ));
                    }

                    curve = decode_curve(child, ctx)?;
                }
                name_str => {
                    ctx.emit_error(DecodeError::unexpected(
                        child,
                        "node",
                        format!("unexpected node `{}`", name_str.escape_default()),
                    ));
                }
            }
        }

        Ok(Self {
            off,
            duration_ms: duration_ms.unwrap_or(default.duration_ms),
            curve: curve.unwrap_or(default.curve),
        })
    }
}

fn decode_curve<S: knuffel::traits::ErrorSpan>(
    node: &knuffel::ast::SpannedNode<S>,
    ctx: &mut knuffel::decode::Context<S>,
) -> Result<Option<Curve>, DecodeError<S>> {
    let mut iter_args = node.arguments.iter();
    let val = iter_args
        .next()
        .ok_or_else(|| DecodeError::missing(node, "additional argument `curve` is required"))?;
    let name: String = knuffel::traits::DecodeScalar::decode(val, ctx)?;

    let curve = match name.as_str() {
        "linear" => Some(Curve::Linear),
        "ease-out-quad" => Some(Curve::EaseOutQuad),
        "ease-out-cubic" => Some(Curve::EaseOutCubic),
        "ease-out-expo" => Some(Curve::EaseOutExpo),
        "ease-out-back" => Some(Curve::EaseOutBack),
        "cubic-bezier" => {
            let mut coord = |what: &str| -> Result<f64, DecodeError<S>> {
                let val = iter_args.next().ok_or_else(|| {
                    DecodeError::missing(
                        node,
                        format!("missing {what} coordinate for cubic Bézier curve control point"),
                    )
                })?;
                // The X axis is time, so it must stay within the animation.
                if what.starts_with('x') {
                    let x: FloatOrInt<0, 1> = knuffel::traits::DecodeScalar::decode(val, ctx)?;
                    Ok(x.0)
                } else {
                    let y: FloatOrInt<{ i32::MIN }, { i32::MAX }> =
                        knuffel::traits::DecodeScalar::decode(val, ctx)?;
                    Ok(y.0)
                }
            };

            let x1 = coord("x1")?;
            let y1 = coord("y1")?;
            let x2 = coord("x2")?;
            let y2 = coord("y2")?;
            Some(Curve::CubicBezier(x1, y1, x2, y2))
        }
        unexpected => {
            ctx.emit_error(DecodeError::unexpected(
                &val.literal,
                "argument",
                format!(
                    "unexpected animation curve `{unexpected}`. \
                    Supported curves are `linear`, `ease-out-quad`, `ease-out-cubic`, \
                    `ease-out-expo`, `ease-out-back` and `cubic-bezier`."
                ),
            ));
            None
        }
    };

    if let Some(val) = iter_args.next() {
        ctx.emit_error(DecodeError::unexpected(
            &val.literal,
            "argument",
            "unexpected argument",
        ));
    }
    reject_properties_and_children(node, ctx);

    Ok(curve)
}
