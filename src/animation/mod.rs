pub mod component;
pub mod interpolation;
pub mod providers;
pub mod spec;
pub mod transitions;
pub mod tweening;

// Re-export commonly used types and functions for convenience
pub use component::{CameraDimension, CameraOptionsComponent};
pub use interpolation::{EasingFunction, Interpolatable, Interpolation};
pub use providers::{
    select_strategy, AnimationSpecProvider, ConvergingSpecProvider, DefaultAnimationSpecProvider,
    DivergingSpecProvider, SpecStrategy,
};
pub use spec::AnimationSpec;
pub use transitions::{
    scale_to_max_duration, CompositeTransitionAnimation, DefaultTransitionAnimationHelper,
    TransitionAnimation, TransitionAnimationComponent, TransitionAnimationHelper,
};
pub use tweening::{
    AnimatingPosition, AnimationDriver, AnimatorState, CameraAnimator, CameraAnimatorFactory,
    SimpleCameraAnimator,
};
