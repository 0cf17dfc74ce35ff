use async_trait::async_trait;
use log::warn;
use serde_json::{json, Value};

use fw_defs::{DiscoveryClient, DiscoveryFactory, InstanceFilter, MonitorError, TagEntry};

/// Services this factory ships discovery clients for. A declared service
/// outside this list is an UnsupportedService error and gets skipped.
pub const SERVICE_LIST: &[&str] = &["ec2", "rds", "lambda"];

/// Builds per-service discovery clients from one shared config load.
pub struct AwsClientFactory {
    shared_config: aws_config::SdkConfig,
}

impl AwsClientFactory {
    pub fn new(shared_config: aws_config::SdkConfig) -> Self {
        AwsClientFactory { shared_config }
    }
}

impl DiscoveryFactory for AwsClientFactory {
    fn client_for(&self, service: &str) -> Result<Box<dyn DiscoveryClient>, MonitorError> {
        match service {
            "ec2" => Ok(Box::new(Ec2Discovery::new(&self.shared_config))),
            "rds" => Ok(Box::new(RdsDiscovery::new(&self.shared_config))),
            "lambda" => Ok(Box::new(LambdaDiscovery::new(&self.shared_config))),
            _ => Err(MonitorError::UnsupportedService(service.to_string())),
        }
    }
}

/// EC2 instance discovery. Pages keep the wire shape
/// (Reservations -> Instances) so the configurable unwrap applies; tags are
/// embedded in the response.
pub struct Ec2Discovery {
    client: aws_sdk_ec2::Client,
}

impl Ec2Discovery {
    pub fn new(shared_config: &aws_config::SdkConfig) -> Self {
        Ec2Discovery {
            client: aws_sdk_ec2::Client::new(shared_config),
        }
    }
}

#[async_trait]
impl DiscoveryClient for Ec2Discovery {
    async fn discover_pages(
        &self,
        operation: &str,
        filters: &[InstanceFilter],
    ) -> Result<Vec<Value>, anyhow::Error> {
        if operation != "describe_instances" {
            return Err(anyhow::anyhow!(
                "ec2 discovery does not support operation {}",
                operation
            ));
        }
        let filters: Vec<aws_sdk_ec2::types::Filter> = filters
            .iter()
            .map(|f| {
                aws_sdk_ec2::types::Filter::builder()
                    .name(&f.name)
                    .set_values(Some(f.values.clone()))
                    .build()
            })
            .collect();

        let mut pages = vec![];
        let mut next_token: Option<String> = None;
        loop {
            let mut request = self.client.describe_instances();
            if !filters.is_empty() {
                request = request.set_filters(Some(filters.clone()));
            }
            if let Some(token) = &next_token {
                request = request.next_token(token);
            }
            let response = request.send().await?;

            let reservations: Vec<Value> = response
                .reservations()
                .iter()
                .map(|reservation| {
                    json!({
                        "Instances": reservation
                            .instances()
                            .iter()
                            .map(ec2_instance_to_value)
                            .collect::<Vec<Value>>()
                    })
                })
                .collect();
            pages.push(json!({ "Reservations": reservations }));

            next_token = response.next_token().map(String::from);
            if next_token.is_none() {
                break;
            }
        }
        Ok(pages)
    }

    async fn lookup_tags(
        &self,
        operation: &str,
        _resource_ref: &str,
    ) -> Result<Vec<TagEntry>, anyhow::Error> {
        Err(anyhow::anyhow!(
            "ec2 embeds tags in the discovery response, no {} lookup",
            operation
        ))
    }
}

fn ec2_instance_to_value(instance: &aws_sdk_ec2::types::Instance) -> Value {
    let tags: Vec<Value> = instance
        .tags()
        .iter()
        .map(|tag| {
            json!({
                "Key": tag.key().unwrap_or_default(),
                "Value": tag.value().unwrap_or_default()
            })
        })
        .collect();
    json!({
        "InstanceId": instance.instance_id().unwrap_or_default(),
        "InstanceType": instance.instance_type().map(|t| t.as_str()).unwrap_or_default(),
        "State": {
            "Name": instance
                .state()
                .and_then(|s| s.name())
                .map(|n| n.as_str())
                .unwrap_or_default()
        },
        "Placement": {
            "AvailabilityZone": instance
                .placement()
                .and_then(|p| p.availability_zone())
                .unwrap_or_default()
        },
        "PrivateIpAddress": instance.private_ip_address().unwrap_or_default(),
        "Tags": tags,
    })
}

/// RDS instance discovery. One collection level (DBInstances); tags need a
/// secondary list_tags_for_resource call keyed by the instance ARN.
pub struct RdsDiscovery {
    client: aws_sdk_rds::Client,
}

impl RdsDiscovery {
    pub fn new(shared_config: &aws_config::SdkConfig) -> Self {
        RdsDiscovery {
            client: aws_sdk_rds::Client::new(shared_config),
        }
    }
}

#[async_trait]
impl DiscoveryClient for RdsDiscovery {
    async fn discover_pages(
        &self,
        operation: &str,
        filters: &[InstanceFilter],
    ) -> Result<Vec<Value>, anyhow::Error> {
        if operation != "describe_db_instances" {
            return Err(anyhow::anyhow!(
                "rds discovery does not support operation {}",
                operation
            ));
        }
        let mut rds_filters = vec![];
        for f in filters {
            rds_filters.push(
                aws_sdk_rds::types::Filter::builder()
                    .name(&f.name)
                    .set_values(Some(f.values.clone()))
                    .build()?,
            );
        }

        let mut pages = vec![];
        let mut marker: Option<String> = None;
        loop {
            let mut request = self.client.describe_db_instances();
            if !rds_filters.is_empty() {
                request = request.set_filters(Some(rds_filters.clone()));
            }
            if let Some(token) = &marker {
                request = request.marker(token);
            }
            let response = request.send().await?;

            let instances: Vec<Value> = response
                .db_instances()
                .iter()
                .map(rds_instance_to_value)
                .collect();
            pages.push(json!({ "DBInstances": instances }));

            marker = response.marker().map(String::from);
            if marker.is_none() {
                break;
            }
        }
        Ok(pages)
    }

    async fn lookup_tags(
        &self,
        operation: &str,
        resource_ref: &str,
    ) -> Result<Vec<TagEntry>, anyhow::Error> {
        if operation != "list_tags_for_resource" {
            return Err(anyhow::anyhow!(
                "rds tag lookup does not support operation {}",
                operation
            ));
        }
        let response = self
            .client
            .list_tags_for_resource()
            .resource_name(resource_ref)
            .send()
            .await?;
        Ok(response
            .tag_list()
            .iter()
            .filter_map(|tag| match (tag.key(), tag.value()) {
                (Some(key), Some(value)) => Some(TagEntry {
                    key: key.to_string(),
                    value: value.to_string(),
                }),
                _ => None,
            })
            .collect())
    }
}

fn rds_instance_to_value(instance: &aws_sdk_rds::types::DbInstance) -> Value {
    json!({
        "DBInstanceIdentifier": instance.db_instance_identifier().unwrap_or_default(),
        "DBInstanceArn": instance.db_instance_arn().unwrap_or_default(),
        "DBInstanceClass": instance.db_instance_class().unwrap_or_default(),
        "Engine": instance.engine().unwrap_or_default(),
        "DBInstanceStatus": instance.db_instance_status().unwrap_or_default(),
        "AvailabilityZone": instance.availability_zone().unwrap_or_default(),
    })
}

/// Lambda function discovery. One collection level (Functions); tags need a
/// secondary list_tags call keyed by the function ARN. list_functions takes
/// no filter predicates.
pub struct LambdaDiscovery {
    client: aws_sdk_lambda::Client,
}

impl LambdaDiscovery {
    pub fn new(shared_config: &aws_config::SdkConfig) -> Self {
        LambdaDiscovery {
            client: aws_sdk_lambda::Client::new(shared_config),
        }
    }
}

#[async_trait]
impl DiscoveryClient for LambdaDiscovery {
    async fn discover_pages(
        &self,
        operation: &str,
        filters: &[InstanceFilter],
    ) -> Result<Vec<Value>, anyhow::Error> {
        if operation != "list_functions" {
            return Err(anyhow::anyhow!(
                "lambda discovery does not support operation {}",
                operation
            ));
        }
        if !filters.is_empty() {
            warn!("lambda list_functions takes no filters, ignoring the configured ones");
        }

        let mut pages = vec![];
        let mut marker: Option<String> = None;
        loop {
            let mut request = self.client.list_functions();
            if let Some(token) = &marker {
                request = request.marker(token);
            }
            let response = request.send().await?;

            let functions: Vec<Value> = response
                .functions()
                .iter()
                .map(lambda_function_to_value)
                .collect();
            pages.push(json!({ "Functions": functions }));

            marker = response.next_marker().map(String::from);
            if marker.is_none() {
                break;
            }
        }
        Ok(pages)
    }

    async fn lookup_tags(
        &self,
        operation: &str,
        resource_ref: &str,
    ) -> Result<Vec<TagEntry>, anyhow::Error> {
        if operation != "list_tags" {
            return Err(anyhow::anyhow!(
                "lambda tag lookup does not support operation {}",
                operation
            ));
        }
        let response = self.client.list_tags().resource(resource_ref).send().await?;
        Ok(response
            .tags()
            .map(|tags| {
                tags.iter()
                    .map(|(key, value)| TagEntry {
                        key: key.clone(),
                        value: value.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

fn lambda_function_to_value(function: &aws_sdk_lambda::types::FunctionConfiguration) -> Value {
    json!({
        "FunctionName": function.function_name().unwrap_or_default(),
        "FunctionArn": function.function_arn().unwrap_or_default(),
        "Runtime": function.runtime().map(|r| r.as_str()).unwrap_or_default(),
        "MemorySize": function.memory_size().unwrap_or_default(),
        "Version": function.version().unwrap_or_default(),
    })
}
