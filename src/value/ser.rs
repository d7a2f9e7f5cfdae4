//! Converts any `T: Serialize` into a [`Value`].

use std::fmt::Display;

use serde::ser::{Error as _, Impossible, Serialize};

use crate::value::Map;
use crate::{Error, Result, Value};

/// Convert a `T` to a `Value`.
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub fn to_value<T>(value: T) -> Result<Value>
where
    T: Serialize,
{
    value.serialize(Serializer)
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::None | Value::Object(_) => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(string) => serializer.serialize_str(string),
            Value::List(list) => list.serialize(serializer),
            Value::Map(map) => map.serialize(serializer),
            Value::Range(a, b) => serializer.serialize_newtype_struct(RANGE, &format!("{a}..{b}")),
        }
    }
}

/// Marks a range so that [`to_value`] can rebuild it. Other serializers see
/// a newtype around the `a..b` string.
const RANGE: &str = "$tincture::Range";

fn parse_range(s: &str) -> Option<Value> {
    let (a, b) = s.split_once("..")?;
    Some(Value::Range(a.parse().ok()?, b.parse().ok()?))
}

fn err_out_of_range() -> Error {
    Error::custom("integer is out of range")
}

fn err_not_string() -> Error {
    Error::custom("map key must be a string")
}

/// Serializer whose output is a `Value`.
struct Serializer;

macro_rules! serialize_int {
    ($($method:ident: $ty:ty),+) => {
        $(
            fn $method(self, v: $ty) -> Result<Self::Ok> {
                i64::try_from(v).map(Value::Integer).map_err(|_| err_out_of_range())
            }
        )+
    };
}

impl serde::Serializer for Serializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeList;
    type SerializeTuple = SerializeList;
    type SerializeTupleStruct = SerializeList;
    type SerializeTupleVariant = SerializeList;

    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    serialize_int! {
        serialize_i8: i8, serialize_i16: i16, serialize_i32: i32, serialize_i64: i64,
        serialize_u8: u8, serialize_u16: u16, serialize_u32: u32, serialize_u64: u64
    }

    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        Ok(Value::Bool(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok> {
        Ok(Value::Float(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok> {
        Ok(Value::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        Ok(Value::String(String::from(v)))
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        Ok(Value::String(String::from(v)))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok> {
        Ok(Value::String(String::from_utf8_lossy(v).into_owned()))
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        Ok(Value::None)
    }

    fn serialize_some<T: ?Sized>(self, value: &T) -> Result<Self::Ok>
    where
        T: Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        Ok(Value::None)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok> {
        Ok(Value::None)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: ?Sized>(self, name: &'static str, value: &T) -> Result<Self::Ok>
    where
        T: Serialize,
    {
        let value = value.serialize(self)?;
        if let (RANGE, Value::String(s)) = (name, &value) {
            if let Some(range) = parse_range(s) {
                return Ok(range);
            }
        }
        Ok(value)
    }

    fn serialize_newtype_variant<T: ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok>
    where
        T: Serialize,
    {
        Ok(Value::from([(variant, to_value(value)?)]))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SerializeList {
            variant: None,
            list: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(SerializeList {
            variant: Some(variant),
            list: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(SerializeMap::default())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(SerializeMap::default())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(SerializeMap {
            variant: Some(variant),
            ..SerializeMap::default()
        })
    }
}

/// Collects sequences, tuples and tuple variants.
struct SerializeList {
    variant: Option<&'static str>,
    list: Vec<Value>,
}

impl SerializeList {
    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.list.push(to_value(value)?);
        Ok(())
    }

    fn finish(self) -> Result<Value> {
        let list = Value::List(self.list);
        Ok(match self.variant {
            Some(name) => Value::from([(name, list)]),
            None => list,
        })
    }
}

impl serde::ser::SerializeSeq for SerializeList {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

impl serde::ser::SerializeTuple for SerializeList {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

impl serde::ser::SerializeTupleStruct for SerializeList {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

impl serde::ser::SerializeTupleVariant for SerializeList {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

/// Collects maps, structs and struct variants.
#[derive(Default)]
struct SerializeMap {
    variant: Option<&'static str>,
    map: Map<String, Value>,
    next_key: Option<String>,
}

impl SerializeMap {
    fn insert<T: ?Sized + Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        self.map.insert(key.to_owned(), to_value(value)?);
        Ok(())
    }

    fn finish(self) -> Result<Value> {
        let map = Value::Map(self.map);
        Ok(match self.variant {
            Some(name) => Value::from([(name, map)]),
            None => map,
        })
    }
}

impl serde::ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        self.next_key = Some(key.serialize(MapKeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| Error::custom("map value serialized before its key"))?;
        self.insert(&key, value)
    }

    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

impl serde::ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.insert(key, value)
    }

    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

impl serde::ser::SerializeStructVariant for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.insert(key, value)
    }

    fn end(self) -> Result<Self::Ok> {
        self.finish()
    }
}

/// Serializes map keys, which must be strings or something displayable as
/// one.
struct MapKeySerializer;

macro_rules! key_to_string {
    ($($method:ident: $ty:ty),+) => {
        $(
            fn $method(self, v: $ty) -> Result<Self::Ok> {
                Ok(v.to_string())
            }
        )+
    };
}

macro_rules! key_rejected {
    ($($method:ident: $ty:ty),+) => {
        $(
            fn $method(self, _v: $ty) -> Result<Self::Ok> {
                Err(err_not_string())
            }
        )+
    };
}

impl serde::Serializer for MapKeySerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = Impossible<String, Error>;
    type SerializeTuple = Impossible<String, Error>;
    type SerializeTupleStruct = Impossible<String, Error>;
    type SerializeTupleVariant = Impossible<String, Error>;
    type SerializeMap = Impossible<String, Error>;
    type SerializeStruct = Impossible<String, Error>;
    type SerializeStructVariant = Impossible<String, Error>;

    key_to_string! {
        serialize_bool: bool, serialize_char: char,
        serialize_i8: i8, serialize_i16: i16, serialize_i32: i32, serialize_i64: i64,
        serialize_u8: u8, serialize_u16: u16, serialize_u32: u32, serialize_u64: u64
    }

    key_rejected! {
        serialize_f32: f32, serialize_f64: f64, serialize_bytes: &[u8]
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        Ok(v.to_owned())
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        Err(err_not_string())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Self::Ok> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        Err(err_not_string())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok> {
        Err(err_not_string())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok> {
        Ok(variant.to_owned())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Self::Ok> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Self::Ok> {
        Err(err_not_string())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(err_not_string())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(err_not_string())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(err_not_string())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(err_not_string())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(err_not_string())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(err_not_string())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(err_not_string())
    }

    fn collect_str<T: ?Sized + Display>(self, value: &T) -> Result<Self::Ok> {
        Ok(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(serde::Serialize)]
    struct Product {
        title: &'static str,
        price: u32,
        tags: Vec<&'static str>,
        sale: Option<f64>,
    }

    #[derive(serde::Serialize)]
    enum Shape {
        Square(u32),
        Rect(u32, u32),
    }

    #[test]
    fn to_value_struct() {
        let value = to_value(Product {
            title: "Hat",
            price: 12,
            tags: vec!["wool"],
            sale: None,
        })
        .unwrap();
        assert_eq!(
            value,
            Value::from([
                ("title", Value::from("Hat")),
                ("price", Value::from(12)),
                ("tags", Value::from(["wool"])),
                ("sale", Value::None),
            ])
        );
    }

    #[test]
    fn to_value_variants() {
        assert_eq!(
            to_value(Shape::Square(2)).unwrap(),
            Value::from([("Square", 2)])
        );
        assert_eq!(
            to_value(Shape::Rect(2, 3)).unwrap(),
            Value::from([("Rect", [2, 3])])
        );
    }

    #[test]
    fn to_value_integer_keys() {
        let map: BTreeMap<u8, &str> = [(1, "one")].into_iter().collect();
        assert_eq!(to_value(map).unwrap(), Value::from([("1", "one")]));
    }

    #[test]
    fn to_value_keeps_ranges() {
        let value = Value::from([("r", Value::Range(-3, 5))]);
        assert_eq!(to_value(&value).unwrap(), value);
        assert_eq!(to_value(Value::Range(i64::MIN, i64::MAX)).unwrap(), Value::Range(i64::MIN, i64::MAX));
    }

    #[test]
    fn to_value_objects_become_nil() {
        #[derive(Debug)]
        struct Answer;

        impl crate::Object for Answer {
            fn get(&self, _: &str) -> Option<Value> {
                Some(Value::from(42))
            }
        }

        let value = Value::from([("a", Value::Object(std::sync::Arc::new(Answer)))]);
        assert_eq!(to_value(&value).unwrap(), Value::from([("a", Value::None)]));
    }

    #[test]
    fn to_value_u64_out_of_range() {
        let err = to_value(u64::MAX).unwrap_err();
        assert_eq!(err.message(), "integer is out of range");
    }
}
