/// Implements [`Object`](crate::object::Object) and [`Class`](crate::class::Class)
/// for a plain struct.
///
/// Listed fields become the class fields, with the struct visibility as
/// field visibility and the `Default` value as declared default. A string
/// after a field overrides its declared type expression. The optional
/// `with` expression receives the generated [`ClassInfo`](crate::class::ClassInfo)
/// and may add a parent, methods and static methods.
///
/// The struct must implement `Default` and `PartialEq`, and every listed
/// field [`IntoValue`](crate::value::IntoValue), [`FromValue`](crate::value::FromValue)
/// and [`TypeExpression`](crate::value::TypeExpression).
///
/// # Examples
///
/// ```
/// use vc_norm::impl_object;
/// use vc_norm::prelude::*;
///
/// #[derive(Default, PartialEq)]
/// struct Point {
///     pub x: i64,
///     pub y: i64,
///     label: Option<String>,
/// }
///
/// impl_object! {
///     Point as "Geo\\Point" {
///         pub x,
///         pub y,
///         label: "?string",
///     }
/// }
///
/// let info = Point::class_info();
/// assert_eq!(info.name(), "Geo\\Point");
/// assert!(info.find_field("label").unwrap().nullable);
///
/// let point = ObjectRef::new(Point { x: 1, y: 2, label: None });
/// assert_eq!(point.read().field("x").unwrap(), Value::from(1));
/// assert!(point.read().field("label").is_err());
/// ```
#[macro_export]
macro_rules! impl_object {
    (
        $ty:ty as $class:literal {
            $( $vis:vis $field:ident $( : $decl:literal )? ),* $(,)?
        }
        $( with $extend:expr )?
    ) => {
        impl $crate::object::Object for $ty {
            #[inline]
            fn class_name(&self) -> &str {
                $class
            }

            fn field(
                &self,
                name: &str,
            ) -> ::core::result::Result<$crate::value::Value, $crate::object::FieldError> {
                $(
                    if name == ::core::stringify!($field)
                        && !$crate::__macro_exports::is_public(::core::stringify!($vis))
                    {
                        return ::core::result::Result::Err(
                            $crate::__macro_exports::inaccessible($class, name),
                        );
                    }
                )*
                self.field_raw(name)
            }

            fn set_field(
                &mut self,
                name: &str,
                value: $crate::value::Value,
            ) -> ::core::result::Result<(), $crate::object::FieldError> {
                $(
                    if name == ::core::stringify!($field)
                        && !$crate::__macro_exports::is_public(::core::stringify!($vis))
                    {
                        return ::core::result::Result::Err(
                            $crate::__macro_exports::inaccessible($class, name),
                        );
                    }
                )*
                self.set_field_raw(name, value)
            }

            fn field_raw(
                &self,
                name: &str,
            ) -> ::core::result::Result<$crate::value::Value, $crate::object::FieldError> {
                $(
                    if name == ::core::stringify!($field) {
                        return ::core::result::Result::Ok(
                            $crate::value::IntoValue::to_value(&self.$field),
                        );
                    }
                )*
                ::core::result::Result::Err($crate::__macro_exports::undefined($class, name))
            }

            fn set_field_raw(
                &mut self,
                name: &str,
                value: $crate::value::Value,
            ) -> ::core::result::Result<(), $crate::object::FieldError> {
                $(
                    if name == ::core::stringify!($field) {
                        return $crate::__macro_exports::assign(&mut self.$field, $class, name, value);
                    }
                )*
                ::core::result::Result::Err($crate::__macro_exports::undefined($class, name))
            }

            fn public_fields(
                &self,
            ) -> $crate::__macro_exports::Vec<($crate::__macro_exports::String, $crate::value::Value)> {
                #[allow(unused_mut)]
                let mut fields = $crate::__macro_exports::Vec::new();
                $(
                    if $crate::__macro_exports::is_public(::core::stringify!($vis)) {
                        fields.push((
                            ::core::convert::From::from(::core::stringify!($field)),
                            $crate::value::IntoValue::to_value(&self.$field),
                        ));
                    }
                )*
                fields
            }

            fn object_eq(&self, other: &dyn $crate::object::Object) -> bool {
                other
                    .as_any()
                    .downcast_ref::<$ty>()
                    .is_some_and(|other| self == other)
            }

            #[inline]
            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            #[inline]
            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }
        }

        impl $crate::class::Class for $ty {
            fn class_info() -> $crate::class::ClassInfo {
                #[allow(unused_variables)]
                let defaults = <$ty as ::core::default::Default>::default();
                let info = $crate::class::ClassInfo::new($class)
                    $(
                        .with_field($crate::__macro_exports::field_info(
                            ::core::stringify!($field),
                            ::core::stringify!($vis),
                            &defaults.$field,
                            ::core::option::Option::<&'static str>::None $( .or(::core::option::Option::Some($decl)) )?,
                        ))
                    )*
                    .with_constructor(|| {
                        $crate::object::ObjectRef::new(<$ty as ::core::default::Default>::default())
                    });
                $( let info = ($extend)(info); )?
                info
            }
        }
    };
}

/// Submits a [`Class`](crate::class::Class) for
/// [`ClassRegistry::auto_register`](crate::class::ClassRegistry::auto_register).
///
/// Without the `auto_register` feature this expands to nothing.
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! impl_auto_register {
    ($ty:ty) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::__macro_exports::AutoRegisterClass(
                <$ty as $crate::class::Class>::class_info
            )
        }
    };
}

/// Submits a [`Class`](crate::class::Class) for
/// [`ClassRegistry::auto_register`](crate::class::ClassRegistry::auto_register).
///
/// Without the `auto_register` feature this expands to nothing.
#[cfg(not(feature = "auto_register"))]
#[macro_export]
macro_rules! impl_auto_register {
    ($ty:ty) => {};
}
