//! GraphQL operations for the Shopify Storefront API.
//!
//! Each operation is a unit struct implementing [`GraphQLQuery`] by hand,
//! with its variables and response shapes in a module of the same name.

use graphql_client::{GraphQLQuery, QueryBody};

macro_rules! storefront_operation {
    ($op:ident, $module:ident, $name:literal, $query:expr) => {
        pub struct $op;

        impl GraphQLQuery for $op {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $query,
                    operation_name: $name,
                }
            }
        }
    };
}

// =============================================================================
// Shop
// =============================================================================

storefront_operation!(
    ShopName,
    shop_name,
    "ShopName",
    "query ShopName { shop { name } }"
);

pub mod shop_name {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, Serialize)]
    pub struct Variables {}

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub shop: Shop,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Shop {
        pub name: String,
    }
}

// =============================================================================
// Inventory
// =============================================================================

storefront_operation!(
    GetVariants,
    get_variants,
    "GetVariants",
    r"query GetVariants($ids: [ID!]!) {
  nodes(ids: $ids) {
    ... on ProductVariant {
      id
      title
      availableForSale
      quantityAvailable
      product {
        title
      }
    }
  }
}"
);

pub mod get_variants {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub ids: Vec<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub nodes: Vec<Option<Node>>,
    }

    /// A node that may or may not be a `ProductVariant`; non-variant nodes
    /// come back as empty objects.
    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub struct Node {
        pub id: Option<String>,
        pub title: Option<String>,
        pub available_for_sale: Option<bool>,
        pub quantity_available: Option<i64>,
        pub product: Option<Product>,
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct Product {
        pub title: String,
    }
}

// =============================================================================
// Checkout
// =============================================================================

storefront_operation!(
    CartCreate,
    cart_create,
    "CartCreate",
    r"mutation CartCreate($input: CartInput!) {
  cartCreate(input: $input) {
    cart {
      id
      checkoutUrl
    }
    userErrors {
      code
      field
      message
    }
  }
}"
);

pub mod cart_create {
    use serde::{Deserialize, Serialize};

    use crate::shopify::types::UserError;

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: CartInput,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct CartInput {
        pub lines: Vec<CartLineInput>,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CartLineInput {
        pub merchandise_id: String,
        pub quantity: u32,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_create: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub cart: Option<Cart>,
        #[serde(default)]
        pub user_errors: Vec<UserError>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Cart {
        pub id: String,
        pub checkout_url: String,
    }
}

// =============================================================================
// Customers
// =============================================================================

storefront_operation!(
    CustomerCreate,
    customer_create,
    "CustomerCreate",
    r"mutation CustomerCreate($input: CustomerCreateInput!) {
  customerCreate(input: $input) {
    customer {
      id
      email
      firstName
      lastName
    }
    customerUserErrors {
      code
      field
      message
    }
  }
}"
);

pub mod customer_create {
    use serde::{Deserialize, Serialize};

    use crate::shopify::types::{Customer, CustomerCreateInput, UserError};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: CustomerCreateInput,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub customer_create: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub customer: Option<Customer>,
        #[serde(default)]
        pub customer_user_errors: Vec<UserError>,
    }
}

storefront_operation!(
    CustomerAccessTokenCreate,
    customer_access_token_create,
    "CustomerAccessTokenCreate",
    r"mutation CustomerAccessTokenCreate($input: CustomerAccessTokenCreateInput!) {
  customerAccessTokenCreate(input: $input) {
    customerAccessToken {
      accessToken
      expiresAt
    }
    customerUserErrors {
      code
      field
      message
    }
  }
}"
);

pub mod customer_access_token_create {
    use serde::{Deserialize, Serialize};

    use crate::shopify::types::{CustomerAccessToken, UserError};

    #[derive(Clone, Serialize)]
    pub struct Variables {
        pub input: Input,
    }

    #[derive(Clone, Serialize)]
    pub struct Input {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub customer_access_token_create: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub customer_access_token: Option<CustomerAccessToken>,
        #[serde(default)]
        pub customer_user_errors: Vec<UserError>,
    }
}

storefront_operation!(
    GetCustomer,
    get_customer,
    "GetCustomer",
    r"query GetCustomer($customerAccessToken: String!) {
  customer(customerAccessToken: $customerAccessToken) {
    id
    email
    firstName
    lastName
  }
}"
);

pub mod get_customer {
    use serde::{Deserialize, Serialize};

    use crate::shopify::types::Customer;

    #[derive(Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub customer_access_token: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub customer: Option<Customer>,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_query_body_shape() {
        let body = GetVariants::build_query(get_variants::Variables {
            ids: vec!["gid://shopify/ProductVariant/1".to_string()],
        });
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["operationName"], "GetVariants");
        assert_eq!(json["variables"]["ids"][0], "gid://shopify/ProductVariant/1");
        assert!(json["query"].as_str().unwrap().contains("quantityAvailable"));
    }

    #[test]
    fn test_get_customer_variables_camel_case() {
        let body = GetCustomer::build_query(get_customer::Variables {
            customer_access_token: "tok".to_string(),
        });
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["variables"]["customerAccessToken"], "tok");
    }

    #[test]
    fn test_variant_nodes_tolerate_non_variants() {
        let raw = r#"{"nodes": [
            {"id": "gid://shopify/ProductVariant/1", "title": "Large", "availableForSale": true,
             "quantityAvailable": 4, "product": {"title": "Tee"}},
            {},
            null
        ]}"#;
        let data: get_variants::ResponseData = serde_json::from_str(raw).unwrap();

        assert_eq!(data.nodes.len(), 3);
        assert!(data.nodes[1].as_ref().unwrap().id.is_none());
        assert!(data.nodes[2].is_none());
    }

    #[test]
    fn test_cart_create_user_errors_parse() {
        let raw = r#"{"cartCreate": {"cart": null, "userErrors": [
            {"code": "INVALID", "field": ["input", "lines", "0"], "message": "Merchandise does not exist"}
        ]}}"#;
        let data: cart_create::ResponseData = serde_json::from_str(raw).unwrap();
        let payload = data.cart_create.unwrap();

        assert!(payload.cart.is_none());
        assert_eq!(payload.user_errors[0].message, "Merchandise does not exist");
    }
}
