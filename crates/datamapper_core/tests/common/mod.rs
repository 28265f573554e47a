#![allow(dead_code)]

use datamapper_core::{
    Capabilities, Converter, DataMapper, DataObject, MapperHandle, MappingError, MappingResult,
    RuleTable, StorageModel, StorageObject, TransferObject, ValidationRule,
};
use uuid::Uuid;

macro_rules! data_object {
    ($ty:ty, $capabilities:expr) => {
        impl DataObject for $ty {
            fn capabilities(&self) -> Capabilities {
                $capabilities
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserDto {
    pub name: Option<String>,
    pub email: Option<String>,
}

data_object!(UserDto, Capabilities::TRANSFER);

impl TransferObject for UserDto {
    fn rule_table() -> RuleTable<Self> {
        RuleTable::<Self>::new()
            .text(
                "name",
                |user| user.name.as_deref(),
                [ValidationRule::not_null(), ValidationRule::not_empty()],
            )
            .text(
                "email",
                |user| user.email.as_deref(),
                [ValidationRule::not_empty().soft()],
            )
    }

    fn requires_validation() -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

data_object!(UserRow, Capabilities::STORAGE);

impl StorageObject for UserRow {}

impl StorageModel for UserRow {
    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

/// Second storage shape for `UserDto`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserSummaryRow {
    pub name: String,
}

data_object!(UserSummaryRow, Capabilities::STORAGE);

impl StorageObject for UserSummaryRow {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDto {
    pub city: Option<String>,
}

data_object!(AddressDto, Capabilities::TRANSFER);

impl TransferObject for AddressDto {
    fn rule_table() -> RuleTable<Self> {
        RuleTable::<Self>::new().text(
            "city",
            |address| address.city.as_deref(),
            [ValidationRule::not_empty().soft()],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRow {
    pub city: String,
}

data_object!(AddressRow, Capabilities::STORAGE);

impl StorageObject for AddressRow {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDto {
    pub reference: String,
    pub address: AddressDto,
}

data_object!(OrderDto, Capabilities::TRANSFER);

impl TransferObject for OrderDto {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub reference: String,
    pub address: AddressRow,
}

data_object!(OrderRow, Capabilities::STORAGE);

impl StorageObject for OrderRow {}

/// Declares both families; never convertible by unary dispatch.
#[derive(Debug)]
pub struct Hybrid;

data_object!(Hybrid, Capabilities::BOTH);

/// Declares neither family.
#[derive(Debug)]
pub struct Loose;

data_object!(Loose, Capabilities::NONE);

pub struct UserConverter;

impl Converter for UserConverter {
    type Transfer = UserDto;
    type Storage = UserRow;

    fn to_storage(&self, transfer: &UserDto) -> MappingResult<UserRow> {
        let mut row = UserRow {
            id: Uuid::nil(),
            name: transfer.name.clone().unwrap_or_default(),
            email: transfer.email.clone().unwrap_or_default(),
        };
        row.assign_new_id();
        Ok(row)
    }

    fn to_transfer(&self, storage: &UserRow) -> MappingResult<UserDto> {
        Ok(UserDto {
            name: Some(storage.name.clone()),
            email: Some(storage.email.clone()),
        })
    }
}

/// Same pair as `UserConverter`; upper-cases names so tests can tell which
/// one ran.
pub struct AltUserConverter;

impl Converter for AltUserConverter {
    type Transfer = UserDto;
    type Storage = UserRow;

    fn to_storage(&self, transfer: &UserDto) -> MappingResult<UserRow> {
        Ok(UserRow {
            id: Uuid::new_v4(),
            name: transfer.name.clone().unwrap_or_default().to_uppercase(),
            email: transfer.email.clone().unwrap_or_default(),
        })
    }

    fn to_transfer(&self, storage: &UserRow) -> MappingResult<UserDto> {
        Ok(UserDto {
            name: Some(storage.name.to_uppercase()),
            email: Some(storage.email.clone()),
        })
    }

    fn name(&self) -> &'static str {
        "alt_user_converter"
    }
}

pub struct UserSummaryConverter;

impl Converter for UserSummaryConverter {
    type Transfer = UserDto;
    type Storage = UserSummaryRow;

    fn to_storage(&self, transfer: &UserDto) -> MappingResult<UserSummaryRow> {
        Ok(UserSummaryRow {
            name: transfer.name.clone().unwrap_or_default(),
        })
    }

    fn to_transfer(&self, storage: &UserSummaryRow) -> MappingResult<UserDto> {
        Ok(UserDto {
            name: Some(storage.name.clone()),
            email: None,
        })
    }
}

pub struct AddressConverter;

impl Converter for AddressConverter {
    type Transfer = AddressDto;
    type Storage = AddressRow;

    fn to_storage(&self, transfer: &AddressDto) -> MappingResult<AddressRow> {
        Ok(AddressRow {
            city: transfer.city.clone().unwrap_or_default(),
        })
    }

    fn to_transfer(&self, storage: &AddressRow) -> MappingResult<AddressDto> {
        Ok(AddressDto {
            city: Some(storage.city.clone()),
        })
    }
}

/// Delegates the nested address through the owning mapper.
pub struct OrderConverter {
    mapper: MapperHandle,
}

impl OrderConverter {
    pub fn new(mapper: MapperHandle) -> Self {
        Self { mapper }
    }
}

impl Converter for OrderConverter {
    type Transfer = OrderDto;
    type Storage = OrderRow;

    fn to_storage(&self, transfer: &OrderDto) -> MappingResult<OrderRow> {
        let address = self
            .mapper
            .mapper()?
            .map_to::<AddressRow>(Some(&transfer.address))?
            .ok_or_else(|| MappingError::conversion(self.name(), "address went missing"))?;
        Ok(OrderRow {
            reference: transfer.reference.clone(),
            address,
        })
    }

    fn to_transfer(&self, storage: &OrderRow) -> MappingResult<OrderDto> {
        let address = self
            .mapper
            .mapper()?
            .map_to::<AddressDto>(Some(&storage.address))?
            .ok_or_else(|| MappingError::conversion(self.name(), "address went missing"))?;
        Ok(OrderDto {
            reference: storage.reference.clone(),
            address,
        })
    }
}

pub fn user(name: Option<&str>, email: Option<&str>) -> UserDto {
    UserDto {
        name: name.map(str::to_string),
        email: email.map(str::to_string),
    }
}

/// Mapper holding only `UserConverter`.
pub fn user_mapper() -> DataMapper {
    let mapper = DataMapper::new();
    mapper
        .register(|_| UserConverter)
        .expect("user converter registers");
    mapper
}
