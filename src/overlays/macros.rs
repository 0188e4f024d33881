//! Boilerplate shared by every overlay implementation

/// Implements `kind`, `is_enabled` and `set_enabled` for an overlay that keeps
/// its toggle in a `bool` field.
///
/// Usage:
/// ```ignore
/// impl OverlayTrait for Compass {
///     impl_overlay_common!(OverlayKind::Compass, enabled);
///     // render / hit_test ...
/// }
/// ```
#[macro_export]
macro_rules! impl_overlay_common {
    ($kind:expr, $enabled_field:ident) => {
        fn kind(&self) -> $crate::overlays::base::OverlayKind {
            $kind
        }

        fn is_enabled(&self) -> bool {
            self.$enabled_field
        }

        fn set_enabled(&mut self, enabled: bool) {
            self.$enabled_field = enabled;
        }
    };
}
