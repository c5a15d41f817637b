use crate::DiResult;
use crate::input::{BoxValue, TypeKey, take_value};
use std::any::Any;

/// A function whose parameters are resolved by type.
///
/// Implemented for every `Fn` taking up to twelve owned, `'static`
/// parameters. `Args` is the tuple of parameter types.
pub trait Callable<Args>: Send + Sync + 'static {
	type Output;

	/// Parameter types, in declaration order
	fn inputs() -> Vec<TypeKey>;

	/// Call with one value per parameter, in declaration order
	fn call(&self, args: Vec<BoxValue>) -> DiResult<Self::Output>;
}

macro_rules! callable_tuple ({ $($param:ident)* } => {
	impl<Func, Ret, $($param,)*> Callable<($($param,)*)> for Func
	where
		Func: Fn($($param),*) -> Ret + Send + Sync + 'static,
		$($param: Any + Send,)*
	{
		type Output = Ret;

		fn inputs() -> Vec<TypeKey> {
			vec![$(TypeKey::of::<$param>(),)*]
		}

		#[inline]
		#[allow(non_snake_case, unused_mut, unused_variables)]
		fn call(&self, args: Vec<BoxValue>) -> DiResult<Ret> {
			let mut args = args.into_iter();
			$(let $param = take_value::<$param>(&mut args)?;)*
			Ok((self)($($param,)*))
		}
	}
});

callable_tuple! {}
callable_tuple! { A }
callable_tuple! { A B }
callable_tuple! { A B C }
callable_tuple! { A B C D }
callable_tuple! { A B C D E }
callable_tuple! { A B C D E F }
callable_tuple! { A B C D E F G }
callable_tuple! { A B C D E F G H }
callable_tuple! { A B C D E F G H I }
callable_tuple! { A B C D E F G H I J }
callable_tuple! { A B C D E F G H I J K }
callable_tuple! { A B C D E F G H I J K L }

#[cfg(test)]
mod tests {
	use super::*;
	use crate::DiError;
	use rstest::rstest;

	fn inputs_of<F: Callable<Args>, Args>(_: &F) -> Vec<TypeKey> {
		F::inputs()
	}

	#[rstest]
	fn reports_parameter_types_in_order() {
		// Arrange
		let func = |_: u8, _: String, _: bool| ();

		// Act
		let inputs = inputs_of(&func);

		// Assert
		assert_eq!(
			inputs,
			vec![
				TypeKey::of::<u8>(),
				TypeKey::of::<String>(),
				TypeKey::of::<bool>()
			]
		);
	}

	#[rstest]
	fn calls_with_downcast_values() {
		// Arrange
		let func = |a: u32, b: u32| a + b;
		let args: Vec<BoxValue> = vec![Box::new(2u32), Box::new(3u32)];

		// Act
		let sum = Callable::<(u32, u32)>::call(&func, args).unwrap();

		// Assert
		assert_eq!(sum, 5);
	}

	#[rstest]
	fn wrong_value_type_is_reported() {
		// Arrange
		let func = |a: u32| a;
		let args: Vec<BoxValue> = vec![Box::new("three")];

		// Act
		let result = Callable::<(u32,)>::call(&func, args);

		// Assert
		assert!(matches!(result, Err(DiError::TypeMismatch { expected: "u32" })));
	}

	#[rstest]
	fn zero_parameters() {
		let func = || 7;
		assert!(inputs_of(&func).is_empty());
		assert_eq!(Callable::<()>::call(&func, Vec::new()).unwrap(), 7);
	}
}
