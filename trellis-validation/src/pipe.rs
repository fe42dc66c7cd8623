//! Transform pipes.
//!
//! A pipe turns one raw handler argument into a typed value or rejects it.
//! Raw arguments are JSON values: path and query parameters arrive as
//! strings, a missing query parameter as `null`, and bodies as parsed JSON.
//! Pipes compose left to right with [`PipeExt::then`].

use crate::{ObjectSchema, PipeError, Validate, ValidationError, ValidationErrors};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;

/// Where an argument comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    Body,
    Query,
    Param,
    Custom,
}

/// Describes the argument a pipe is transforming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentMetadata {
    pub kind: ArgumentKind,
    /// Parameter name, `None` for a whole body
    pub data: Option<String>,
}

impl ArgumentMetadata {
    pub fn body() -> Self {
        Self {
            kind: ArgumentKind::Body,
            data: None,
        }
    }

    pub fn param(name: impl Into<String>) -> Self {
        Self {
            kind: ArgumentKind::Param,
            data: Some(name.into()),
        }
    }

    pub fn query(name: impl Into<String>) -> Self {
        Self {
            kind: ArgumentKind::Query,
            data: Some(name.into()),
        }
    }

    pub fn custom() -> Self {
        Self {
            kind: ArgumentKind::Custom,
            data: None,
        }
    }
}

/// A synchronous transform from one argument to a typed value
pub trait PipeTransform<I = Value>: Send + Sync {
    type Output;

    fn transform(&self, value: I, metadata: &ArgumentMetadata) -> Result<Self::Output, PipeError>;
}

/// Chaining for pipes
pub trait PipeExt<I>: PipeTransform<I> + Sized {
    /// Feed this pipe's output into `next`
    fn then<P: PipeTransform<Self::Output>>(self, next: P) -> Then<Self, P> {
        Then {
            first: self,
            second: next,
        }
    }
}

impl<I, P: PipeTransform<I>> PipeExt<I> for P {}

/// Two pipes run in sequence; the first failure short-circuits
#[derive(Debug, Clone)]
pub struct Then<A, B> {
    first: A,
    second: B,
}

impl<I, A, B> PipeTransform<I> for Then<A, B>
where
    A: PipeTransform<I>,
    B: PipeTransform<A::Output>,
{
    type Output = B::Output;

    fn transform(&self, value: I, metadata: &ArgumentMetadata) -> Result<Self::Output, PipeError> {
        let intermediate = self.first.transform(value, metadata)?;
        self.second.transform(intermediate, metadata)
    }
}

/// Passes the raw value through untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl PipeTransform for Identity {
    type Output = Value;

    fn transform(&self, value: Value, _: &ArgumentMetadata) -> Result<Value, PipeError> {
        Ok(value)
    }
}

/// Deserializes input into a DTO and runs its `Validate` rules
pub struct ValidationPipe<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> ValidationPipe<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for ValidationPipe<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PipeTransform for ValidationPipe<T>
where
    T: DeserializeOwned + Validate,
{
    type Output = T;

    fn transform(&self, value: Value, _: &ArgumentMetadata) -> Result<T, PipeError> {
        if !value.is_object() {
            return Err(PipeError::bad_request("Request body must be a JSON object"));
        }
        let shape = T::shape().validate(&value);
        let dto: T = match serde_json::from_value(value) {
            Ok(dto) => dto,
            Err(e) => {
                return Err(match shape {
                    Err(errors) => errors.into(),
                    Ok(()) => PipeError::from(ValidationErrors::from(
                        ValidationError::new("", format!("Invalid request body: {}", e))
                            .with_constraint("invalid_type"),
                    )),
                });
            }
        };
        dto.validate()
            .map_err(|errors| PipeError::from(ValidationErrors::new(errors)))?;
        Ok(dto)
    }
}

/// Checks raw input against an [`ObjectSchema`] before deserializing it
pub struct SchemaPipe<T> {
    schema: ObjectSchema,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SchemaPipe<T> {
    pub fn new(schema: ObjectSchema) -> Self {
        Self {
            schema,
            _marker: PhantomData,
        }
    }

    pub fn schema(&self) -> &ObjectSchema {
        &self.schema
    }
}

impl<T: DeserializeOwned> PipeTransform for SchemaPipe<T> {
    type Output = T;

    fn transform(&self, value: Value, _: &ArgumentMetadata) -> Result<T, PipeError> {
        self.schema.validate(&value)?;
        serde_json::from_value(value)
            .map_err(|e| PipeError::bad_request(format!("Invalid request body: {}", e)))
    }
}
