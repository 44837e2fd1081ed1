/// Declare a struct that can be populated by the assigner.
///
/// Each field may carry a naming tag after `=>`: a replacement name, options
/// such as `",omitempty"`, or `"-"` to skip the field. Every field type must
/// itself implement [`Destination`](crate::firestore::Destination).
///
/// ```
/// firedecode::record! {
/// 	#[derive(Debug, Default)]
/// 	pub struct Order {
/// 		pub id: String => "orderId",
/// 		pub quantity: i32,
/// 		pub internal: bool => "-",
/// 	}
/// }
///
/// let mut order = Order::default();
/// let mut fields = firedecode::firestore::Map::new();
/// fields.insert("orderId".into(), firedecode::firestore::Value::String("o-1".into()));
/// fields.insert("Quantity".into(), firedecode::firestore::Value::Integer(3));
/// firedecode::firestore::assign(&mut order, &fields.into()).unwrap();
/// assert_eq!((order.id.as_str(), order.quantity), ("o-1", 3));
/// ```
#[macro_export]
macro_rules! record {
	(@tag $tag:literal) => {
		::core::option::Option::Some($tag)
	};
	(@tag) => {
		::core::option::Option::None
	};
	(
		$(#[$meta:meta])*
		$vis:vis struct $name:ident {
			$(
				$(#[$field_meta:meta])*
				$field_vis:vis $field:ident : $ty:ty $(=> $tag:literal)?
			),* $(,)?
		}
	) => {
		$(#[$meta])*
		$vis struct $name {
			$(
				$(#[$field_meta])*
				$field_vis $field: $ty,
			)*
		}

		impl $crate::firestore::RecordSlot for $name {
			fn record_type(&self) -> ::core::any::TypeId {
				::core::any::TypeId::of::<Self>()
			}

			fn record_name(&self) -> &'static str {
				::core::stringify!($name)
			}

			fn declared_fields(&self) -> ::std::vec::Vec<$crate::firestore::FieldDecl> {
				::std::vec![
					$(
						$crate::firestore::FieldDecl {
							name: ::core::stringify!($field),
							tag: $crate::record!(@tag $($tag)?),
							leaf: <$ty as $crate::firestore::Destination>::leaf_kind(),
						},
					)*
				]
			}

			#[allow(unused_assignments, unused_mut, unused_variables)]
			fn field(&mut self, index: usize) -> ::core::option::Option<&mut dyn $crate::firestore::Destination> {
				let mut position = 0_usize;
				$(
					if index == position {
						return ::core::option::Option::Some(&mut self.$field);
					}
					position += 1;
				)*
				let _ = position;
				::core::option::Option::None
			}
		}

		impl $crate::firestore::Destination for $name {
			fn slot(&mut self) -> $crate::firestore::Slot<'_> {
				$crate::firestore::Slot::Record(self)
			}
		}
	};
}
