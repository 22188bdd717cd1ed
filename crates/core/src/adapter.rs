//! Mapping from upstream owner records to canonical customer entities.

use crate::domain::customer::{
    Customer, CustomerDetail, CustomerId, Pet, PETCLINIC_SOURCE, UNKNOWN_PET_TYPE,
};
use crate::domain::owner::{RawOwnerRecord, RawPet};
use crate::metrics::derive_created_at;

pub fn map_owner_to_customer(raw: &RawOwnerRecord) -> Customer {
    Customer {
        id: CustomerId(raw.id.to_string()),
        name: full_name(raw),
        city: raw.city.clone(),
        address: raw.address.clone(),
        phone: raw.telephone.clone(),
        pets_count: raw.pets.as_ref().map(|pets| pets.len() as u32).unwrap_or(0),
        email: None,
        created_from: PETCLINIC_SOURCE.to_string(),
        created_at: derive_created_at(raw.id),
    }
}

pub fn map_owner_to_customer_detail(raw: &RawOwnerRecord) -> CustomerDetail {
    CustomerDetail {
        id: raw.id,
        full_name: full_name(raw),
        address: raw.address.clone(),
        city: raw.city.clone(),
        telephone: raw.telephone.clone(),
        pets: raw.pets.iter().flatten().map(map_pet).collect(),
    }
}

fn map_pet(raw: &RawPet) -> Pet {
    Pet {
        id: raw.id,
        name: raw.name.clone(),
        birth_date: raw.birth_date.clone(),
        pet_type: raw
            .pet_type
            .as_ref()
            .and_then(|pet_type| pet_type.name.clone())
            .unwrap_or_else(|| UNKNOWN_PET_TYPE.to_string()),
    }
}

fn full_name(raw: &RawOwnerRecord) -> String {
    format!("{} {}", raw.first_name, raw.last_name).trim().to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{map_owner_to_customer, map_owner_to_customer_detail};
    use crate::domain::owner::{RawOwnerRecord, RawPet, RawPetType};

    fn owner(id: i64, first: &str, last: &str) -> RawOwnerRecord {
        RawOwnerRecord {
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            address: None,
            city: None,
            telephone: None,
            pets: None,
        }
    }

    fn pet(id: i64, type_name: Option<&str>) -> RawPet {
        RawPet {
            id,
            name: format!("pet-{id}"),
            birth_date: Some("2020-01-01".to_string()),
            pet_type: type_name
                .map(|name| RawPetType { id: Some(1), name: Some(name.to_string()) }),
        }
    }

    #[test]
    fn customer_name_is_trimmed_single_space_join() {
        assert_eq!(map_owner_to_customer(&owner(1, "George", "Franklin")).name, "George Franklin");
        assert_eq!(map_owner_to_customer(&owner(2, "", "Davis")).name, "Davis");
        assert_eq!(map_owner_to_customer(&owner(3, "Eduardo", "")).name, "Eduardo");
        assert_eq!(map_owner_to_customer(&owner(4, "", "")).name, "");
    }

    #[test]
    fn customer_carries_string_id_provenance_and_pet_count() {
        let mut raw = owner(12, "Betty", "Davis");
        raw.city = Some("Sun Prairie".to_string());
        raw.telephone = Some("6085551749".to_string());
        raw.pets = Some(vec![pet(1, Some("dog")), pet(2, None)]);

        let customer = map_owner_to_customer(&raw);

        assert_eq!(customer.id.0, "12");
        assert_eq!(customer.pets_count, 2);
        assert_eq!(customer.phone.as_deref(), Some("6085551749"));
        assert_eq!(customer.email, None);
        assert_eq!(customer.created_from, "petclinic");
    }

    #[test]
    fn missing_pets_count_as_zero() {
        assert_eq!(map_owner_to_customer(&owner(5, "Peter", "McTavish")).pets_count, 0);
    }

    #[test]
    fn detail_uses_unknown_placeholder_and_null_contact_fields() {
        let mut raw = owner(6, "Jean", "Coleman");
        raw.pets = Some(vec![pet(7, Some("cat")), pet(8, None)]);

        let detail = map_owner_to_customer_detail(&raw);

        assert_eq!(detail.id, 6);
        assert_eq!(detail.full_name, "Jean Coleman");
        assert_eq!(detail.pets[0].pet_type, "cat");
        assert_eq!(detail.pets[1].pet_type, "Unknown");

        let serialized = serde_json::to_value(&detail).expect("detail should serialize");
        assert_eq!(serialized["address"], Value::Null);
        assert_eq!(serialized["city"], Value::Null);
        assert_eq!(serialized["telephone"], Value::Null);
        assert_eq!(serialized["pets"][1]["type"], json!("Unknown"));
    }

    #[test]
    fn detail_preserves_pet_order_and_empty_strings() {
        let mut raw = owner(9, "Maria", "Escobito");
        raw.city = Some(String::new());
        raw.pets = Some(vec![pet(30, Some("lizard")), pet(10, Some("dog")), pet(20, None)]);

        let detail = map_owner_to_customer_detail(&raw);

        assert_eq!(detail.city.as_deref(), Some(""));
        let ids: Vec<i64> = detail.pets.iter().map(|pet| pet.id).collect();
        assert_eq!(ids, vec![30, 10, 20]);
    }
}
