//! Network access attached to functions.

use serde_json::{Value, json};

use super::expr::Expr;

/// Security groups and subnets a function runs in. Shared between functions
/// behind an `Arc` and never changed after construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkAccess {
    security_group_ids: Vec<Expr>,
    subnet_ids: Vec<Expr>,
}

impl NetworkAccess {
    pub fn new(security_group_ids: Vec<Expr>, subnet_ids: Vec<Expr>) -> Self {
        NetworkAccess {
            security_group_ids,
            subnet_ids,
        }
    }

    pub fn security_group_ids(&self) -> &[Expr] {
        &self.security_group_ids
    }

    pub fn subnet_ids(&self) -> &[Expr] {
        &self.subnet_ids
    }

    pub(crate) fn render(&self) -> Value {
        let groups: Vec<Value> = self.security_group_ids.iter().map(Expr::render).collect();
        let subnets: Vec<Value> = self.subnet_ids.iter().map(Expr::render).collect();
        json!({ "SecurityGroupIds": groups, "SubnetIds": subnets })
    }

    pub(crate) fn expressions(&self) -> Vec<(String, Expr)> {
        let groups = self
            .security_group_ids
            .iter()
            .enumerate()
            .map(|(i, e)| (format!("VpcConfig.SecurityGroupIds[{i}]"), e.clone()));
        let subnets = self
            .subnet_ids
            .iter()
            .enumerate()
            .map(|(i, e)| (format!("VpcConfig.SubnetIds[{i}]"), e.clone()));
        groups.chain(subnets).collect()
    }
}
