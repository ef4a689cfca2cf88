//! Property-based tests for the mapping engine
//!
//! These tests verify invariants that should hold for all generated
//! shapes and values: mapping into the same type is an exact round trip,
//! and mapping into a renamed structural twin preserves every field.

use proptest::collection::vec;
use proptest::prelude::*;

use remap_core::{FieldDescriptor, Kind, Mapper, ScalarKind, TypeDescriptor, Value};

// Strategy functions for property testing

/// Strategy for generating scalar kinds
fn scalar_kind_strategy() -> impl Strategy<Value = ScalarKind> {
    prop_oneof![
        Just(ScalarKind::Bool),
        Just(ScalarKind::Int),
        Just(ScalarKind::Uint),
        Just(ScalarKind::Float),
        Just(ScalarKind::String),
        Just(ScalarKind::Bytes),
    ]
}

/// Strategy for generating scalar descriptors
fn scalar_type_strategy() -> impl Strategy<Value = TypeDescriptor> {
    scalar_kind_strategy().prop_map(TypeDescriptor::scalar)
}

/// Strategy for generating field types: scalars, optionals of scalars,
/// sequences of scalars
fn component_type_strategy() -> impl Strategy<Value = TypeDescriptor> {
    prop_oneof![
        scalar_type_strategy(),
        scalar_type_strategy().prop_map(TypeDescriptor::optional),
        scalar_type_strategy().prop_map(TypeDescriptor::sequence),
    ]
}

/// Strategy for generating struct descriptors with unique field names
fn struct_type_strategy() -> impl Strategy<Value = TypeDescriptor> {
    vec(component_type_strategy(), 1..5).prop_map(|types| {
        let fields = types
            .into_iter()
            .enumerate()
            .map(|(index, ty)| FieldDescriptor::new(format!("F{index}"), ty))
            .collect();
        TypeDescriptor::structure("Generated", fields)
    })
}

/// Strategy for generating a value of the given type
fn value_of_strategy(ty: &TypeDescriptor) -> BoxedStrategy<Value> {
    match ty.kind() {
        Kind::Scalar => match ty.scalar_kind().expect("scalar descriptor") {
            ScalarKind::Bool => any::<bool>().prop_map(Value::Bool).boxed(),
            ScalarKind::Int => any::<i64>().prop_map(Value::Int).boxed(),
            ScalarKind::Uint => any::<u64>().prop_map(Value::Uint).boxed(),
            ScalarKind::Float => (-1.0e6f64..1.0e6).prop_map(Value::Float).boxed(),
            ScalarKind::String => "[a-z0-9 ]{0,12}".prop_map(Value::String).boxed(),
            ScalarKind::Bytes => vec(any::<u8>(), 0..8).prop_map(Value::Bytes).boxed(),
        },
        Kind::Opaque => {
            let name = ty.identity();
            "[a-z]{0,8}"
                .prop_map(move |payload| Value::opaque(name.clone(), serde_json::json!(payload)))
                .boxed()
        }
        Kind::Struct => {
            let ty = ty.clone();
            let mut fields: BoxedStrategy<Vec<Value>> = Just(Vec::new()).boxed();
            for field in ty.fields() {
                let field_strategy = value_of_strategy(field.ty());
                fields = (fields, field_strategy)
                    .prop_map(|(mut values, value)| {
                        values.push(value);
                        values
                    })
                    .boxed();
            }
            fields
                .prop_map(move |values| Value::structure(&ty, values).expect("coherent struct"))
                .boxed()
        }
        Kind::Optional => {
            let none_ty = ty.clone();
            let some_ty = ty.clone();
            let pointee = ty.pointee().expect("optional descriptor").clone();
            prop_oneof![
                Just(()).prop_map(move |_| Value::none(&none_ty).expect("optional")),
                value_of_strategy(&pointee)
                    .prop_map(move |inner| Value::some(&some_ty, inner).expect("optional")),
            ]
            .boxed()
        }
        Kind::Sequence => {
            let ty = ty.clone();
            let element = ty.element().expect("sequence descriptor").clone();
            vec(value_of_strategy(&element), 0..4)
                .prop_map(move |items| Value::sequence(&ty, items).expect("coherent sequence"))
                .boxed()
        }
    }
}

/// Strategy pairing a struct descriptor with a value of that type
fn typed_struct_strategy() -> impl Strategy<Value = (TypeDescriptor, Value)> {
    struct_type_strategy()
        .prop_flat_map(|ty| value_of_strategy(&ty).prop_map(move |value| (ty.clone(), value)))
}

proptest! {
    #[test]
    fn prop_identity_round_trip((ty, value) in typed_struct_strategy()) {
        let mapper = Mapper::new();
        let mut dest = ty.zero_value();
        mapper.map(&value, &mut dest, false).unwrap();
        prop_assert_eq!(dest, value);
    }

    #[test]
    fn prop_identity_round_trip_is_loose_insensitive((ty, value) in typed_struct_strategy()) {
        let mapper = Mapper::new();
        let strict = mapper.map_into(&value, &ty, false).unwrap();
        let loose = mapper.map_into(&value, &ty, true).unwrap();
        prop_assert_eq!(strict, loose);
    }

    #[test]
    fn prop_renamed_twin_preserves_every_field((ty, value) in typed_struct_strategy()) {
        // same fields under a different type name forces the field walk
        let twin = TypeDescriptor::structure("GeneratedTwin", ty.fields().to_vec());
        let mapper = Mapper::new();
        let dest = mapper.map_into(&value, &twin, false).unwrap();

        let source = value.as_struct().expect("struct source");
        let mapped = dest.as_struct().expect("struct destination");
        for field in ty.fields() {
            prop_assert_eq!(source.get(field.name()), mapped.get(field.name()));
        }
    }

    #[test]
    fn prop_sequences_preserve_length_and_order(values in vec(any::<i64>(), 0..16)) {
        let seq_ty = TypeDescriptor::sequence(TypeDescriptor::scalar(ScalarKind::Int));
        let holder = TypeDescriptor::structure(
            "Holder",
            vec![FieldDescriptor::new("Items", seq_ty.clone())],
        );
        let twin = TypeDescriptor::structure(
            "HolderTwin",
            vec![FieldDescriptor::new("Items", seq_ty.clone())],
        );
        let items: Vec<Value> = values.iter().copied().map(Value::Int).collect();
        let source = Value::structure(
            &holder,
            vec![Value::sequence(&seq_ty, items).unwrap()],
        )
        .unwrap();

        let mapper = Mapper::new();
        let dest = mapper.map_into(&source, &twin, false).unwrap();
        let mapped = dest
            .as_struct()
            .unwrap()
            .get("Items")
            .unwrap()
            .as_sequence()
            .unwrap();
        prop_assert_eq!(mapped.len(), values.len());
        for (index, expected) in values.iter().enumerate() {
            prop_assert_eq!(&mapped.items()[index], &Value::Int(*expected));
        }
    }
}
