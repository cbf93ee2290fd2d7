//! Trampoline generators.
//!
//! Each macro takes the callable's original definition, annotated with
//! `as MarkerType`, and emits (a) the callable itself, whose body consults
//! `dispatch` and falls back to the original code, and (b) the marker type
//! implementing `Target`.
//!
//! Captured parameter types must be owned (or `'static`) and implement
//! `Debug`; receivers are captured as `Receiver` and need neither.

/// Declare an interceptable free function.
///
/// ```ignore
/// intercept! {
///     pub fn greeting() -> &'static str as GreetingFn { "Non mocked." }
/// }
/// ```
#[macro_export]
macro_rules! intercept {
    (
        $(#[$attr:meta])*
        $vis:vis fn $name:ident($($arg:ident: $ty:ty),* $(,)?) -> $ret:ty as $target:ident $body:block
    ) => {
        $(#[$attr])*
        $vis fn $name($($arg: $ty),*) -> $ret {
            match $crate::dispatch::<$target>(($($arg,)*)) {
                $crate::Disposition::Intercepted(__output) => __output,
                $crate::Disposition::CallOriginal(($($arg,)*)) => $body
            }
        }

        $vis struct $target;

        impl $crate::Target for $target {
            type Inputs = ($($ty,)*);
            type Output = $ret;

            const NAME: &'static str = stringify!($name);
            const KIND: $crate::TargetKind = $crate::TargetKind::FreeFunction;
            const ARITY: usize = 0usize $(+ $crate::__count_one!($arg))*;

            fn debug_inputs(inputs: &Self::Inputs) -> ::std::string::String {
                $crate::__debug_inputs!(inputs; $($arg),*)
            }
        }
    };
}

/// Declare interceptable static methods (associated functions).
///
/// ```ignore
/// intercept_static! {
///     impl MyClass {
///         pub fn method1(val: i32) -> i32 as MyClassMethod1 { val }
///     }
/// }
/// ```
#[macro_export]
macro_rules! intercept_static {
    (
        impl $ty:ty {
            $(
                $(#[$attr:meta])*
                $vis:vis fn $name:ident($($arg:ident: $aty:ty),* $(,)?) -> $ret:ty as $target:ident $body:block
            )+
        }
    ) => {
        impl $ty {
            $(
                $(#[$attr])*
                $vis fn $name($($arg: $aty),*) -> $ret {
                    match $crate::dispatch::<$target>(($($arg,)*)) {
                        $crate::Disposition::Intercepted(__output) => __output,
                        $crate::Disposition::CallOriginal(($($arg,)*)) => $body
                    }
                }
            )+
        }

        $(
            $vis struct $target;

            impl $crate::Target for $target {
                type Inputs = ($($aty,)*);
                type Output = $ret;

                const NAME: &'static str =
                    concat!(stringify!($ty), "::", stringify!($name));
                const KIND: $crate::TargetKind = $crate::TargetKind::StaticMethod;
                const ARITY: usize = 0usize $(+ $crate::__count_one!($arg))*;

                fn debug_inputs(inputs: &Self::Inputs) -> ::std::string::String {
                    $crate::__debug_inputs!(inputs; $($arg),*)
                }
            }
        )+
    };
}

/// Declare interceptable instance methods taking `&self`.
///
/// The receiver is captured as the first mock-invocation parameter, so a
/// method of n declared parameters has a capture arity of n + 1.
///
/// ```ignore
/// intercept_methods! {
///     impl MyClass {
///         pub fn method2(&self, val: i32) -> i32 as MyClassMethod2 { val }
///     }
/// }
/// ```
#[macro_export]
macro_rules! intercept_methods {
    (
        impl $ty:ty {
            $(
                $(#[$attr:meta])*
                $vis:vis fn $name:ident(&$self_:ident $(, $arg:ident: $aty:ty)* $(,)?) -> $ret:ty as $target:ident $body:block
            )+
        }
    ) => {
        impl $ty {
            $(
                $(#[$attr])*
                $vis fn $name(&$self_ $(, $arg: $aty)*) -> $ret {
                    match $crate::dispatch::<$target>((
                        $crate::Receiver::capture($self_),
                        $($arg,)*
                    )) {
                        $crate::Disposition::Intercepted(__output) => __output,
                        $crate::Disposition::CallOriginal((_, $($arg,)*)) => $body
                    }
                }
            )+
        }

        $(
            $vis struct $target;

            impl $crate::Target for $target {
                type Inputs = ($crate::Receiver, $($aty,)*);
                type Output = $ret;

                const NAME: &'static str =
                    concat!(stringify!($ty), "::", stringify!($name));
                const KIND: $crate::TargetKind = $crate::TargetKind::Method;
                const ARITY: usize = 1usize $(+ $crate::__count_one!($arg))*;

                fn debug_inputs(inputs: &Self::Inputs) -> ::std::string::String {
                    $crate::__debug_inputs!(inputs; __receiver $(, $arg)*)
                }
            }
        )+
    };
}

/// Declare an interceptable trait implementation.
///
/// The generated methods are the dynamic dispatch slots themselves, so calls
/// reached through a base-type reference (`&dyn Trait`) are redirected
/// identically to calls on the concrete type.
///
/// ```ignore
/// intercept_impl! {
///     impl Interface for Impl {
///         fn func(&self, b: i32) -> i32 as ImplFunc { 888 + b }
///     }
/// }
/// ```
#[macro_export]
macro_rules! intercept_impl {
    (
        impl $trait_:ident for $ty:ty {
            $(
                $(#[$attr:meta])*
                fn $name:ident(&$self_:ident $(, $arg:ident: $aty:ty)* $(,)?) -> $ret:ty as $target:ident $body:block
            )+
        }
    ) => {
        impl $trait_ for $ty {
            $(
                $(#[$attr])*
                fn $name(&$self_ $(, $arg: $aty)*) -> $ret {
                    match $crate::dispatch::<$target>((
                        $crate::Receiver::capture($self_),
                        $($arg,)*
                    )) {
                        $crate::Disposition::Intercepted(__output) => __output,
                        $crate::Disposition::CallOriginal((_, $($arg,)*)) => $body
                    }
                }
            )+
        }

        $(
            pub struct $target;

            impl $crate::Target for $target {
                type Inputs = ($crate::Receiver, $($aty,)*);
                type Output = $ret;

                const NAME: &'static str = concat!(
                    "<", stringify!($ty), " as ", stringify!($trait_), ">::",
                    stringify!($name)
                );
                const KIND: $crate::TargetKind = $crate::TargetKind::VirtualMethod;
                const ARITY: usize = 1usize $(+ $crate::__count_one!($arg))*;

                fn debug_inputs(inputs: &Self::Inputs) -> ::std::string::String {
                    $crate::__debug_inputs!(inputs; __receiver $(, $arg)*)
                }
            }
        )+
    };
}

/// Build an input matcher from one placeholder pattern per captured
/// parameter (receiver included for methods). The placeholder count is
/// checked against the target's capture arity at setup time.
///
/// ```ignore
/// each.call(matching!(_, 123)).returns(114);
/// ```
#[macro_export]
macro_rules! matching {
    ($($pat:pat),* $(,)?) => {
        $crate::expect::Matching::new(
            |inputs| match inputs {
                ($($pat,)*) => true,
                #[allow(unreachable_patterns)]
                _ => false,
            },
            0usize $(+ $crate::__count_one!($pat))*,
        )
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __count_one {
    ($x:tt) => {
        1usize
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __debug_inputs {
    ($inputs:expr;) => {{
        let _ = $inputs;
        ::std::string::String::from("()")
    }};
    ($inputs:expr; $($arg:ident),+) => {{
        let ($($arg,)+) = $inputs;
        let mut __rendered = ::std::string::String::from("(");
        $(
            if __rendered.len() > 1 {
                __rendered.push_str(", ");
            }
            __rendered.push_str(&::std::format!("{:?}", $arg));
        )+
        __rendered.push(')');
        __rendered
    }};
}
