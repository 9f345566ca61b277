//! Macros for ergonomic container seeding.

/// Build a seed list of `(path, value)` pairs for container construction.
///
/// Values are JSON literals and may span several tokens (`-1`); composites
/// are accepted by the macro but rejected at construction time.
///
/// # Example
///
/// ```
/// use stateflow::lineage::Blueprint;
/// use stateflow::states;
///
/// let blueprint = Blueprint::builder("door").build().unwrap();
/// let container = blueprint
///     .construct(states! {
///         "door-open" => false,
///         "door-label" => "front",
///         "door-uses" => 12,
///         "door-offset" => -3,
///     })
///     .unwrap();
///
/// assert_eq!(container.current_states().len(), 4);
/// assert_eq!(container.general_state().flags.len(), 1);
/// ```
#[macro_export]
macro_rules! states {
    // All pairs emitted
    (@pairs [$($done:tt)*]) => {
        ::std::vec![ $($done)* ]
    };
    (@pairs [$($done:tt)*] $path:expr => $($rest:tt)+) => {
        $crate::states!(@value [$($done)*] ($path) [] $($rest)+)
    };
    // Value tokens are collected up to the next top-level comma
    (@value [$($done:tt)*] ($path:expr) [$($value:tt)+] , $($rest:tt)*) => {
        $crate::states!(
            @pairs [$($done)* ($path, $crate::__private::json!($($value)+)),] $($rest)*
        )
    };
    (@value [$($done:tt)*] ($path:expr) [$($value:tt)+]) => {
        $crate::states!(@pairs [$($done)* ($path, $crate::__private::json!($($value)+)),])
    };
    (@value [$($done:tt)*] ($path:expr) [$($value:tt)*] $next:tt $($rest:tt)*) => {
        $crate::states!(@value [$($done)*] ($path) [$($value)* $next] $($rest)*)
    };
    () => {
        ::std::vec::Vec::<(&str, $crate::__private::Value)>::new()
    };
    ($($pairs:tt)+) => {
        $crate::states!(@pairs [] $($pairs)+)
    };
}
