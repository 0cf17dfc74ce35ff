use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use fw_defs::{
    AlarmApi, AlarmPage, AlarmRecord, AlarmSpec, DashboardApi, DashboardEntry, DiscoveryClient,
    Instance, InstanceFilter, NotificationApi, ServiceDefinition, SnapshotStore, TagEntry,
};

pub fn instance(identity: &str, instance_id: &str) -> Instance {
    Instance::new(
        identity.to_string(),
        json!({
            "InstanceId": instance_id,
            "Placement": {"AvailabilityZone": "us-east-1a"},
            "Tags": []
        }),
    )
}

/// An EC2-shaped service definition with `rules` alarm rules (rule0..ruleN),
/// even rules critical + send_ok, odd rules warning, plus one alarm chart and
/// one metric chart.
pub fn ec2_service(rules: usize) -> ServiceDefinition {
    let mut alarms = serde_json::Map::new();
    for i in 0..rules {
        alarms.insert(
            format!("rule{}", i),
            json!({
                "AlarmDescription": format!("Alarm for Metric{}", i),
                "AlarmAction": if i % 2 == 0 { "critical" } else { "warning" },
                "send_ok": i % 2 == 0,
                "ComparisonOperator": "GreaterThanThreshold",
                "EvaluationPeriods": 2,
                "Statistic": "Average",
                "MetricName": format!("Metric{}", i),
                "Namespace": "AWS/EC2",
                "Period": 300,
                "Threshold": 60
            }),
        );
    }
    serde_json::from_value(json!({
        "Service": "ec2",
        "DiscoverInstance": "describe_instances",
        "InstanceFilters": [],
        "InstanceIterator1": "Reservations",
        "InstanceIterator2": "Instances",
        "AlarmDimName": "InstanceId",
        "TagsKey": "Tags",
        "FriendlyName": "Name",
        "EnsureUniqueName": true,
        "AlarmPrefix": "fleetwatch",
        "ReportARN": "arn:report",
        "S3Suffix": "inst",
        "Alarms": Value::Object(alarms),
        "AlarmDestinations": {
            "info": null,
            "warning": "arn:warning",
            "critical": "arn:critical"
        },
        "Charts": {
            "CPU": {
                "ch_type": "metric",
                "is_alarm": true,
                "metric_list": ["Metric0"],
                "period": 300,
                "view": "timeSeries",
                "stacked": false
            },
            "Network": {
                "ch_type": "metric",
                "is_alarm": false,
                "avail": "Placement.AvailabilityZone",
                "metric_list": [["AWS/EC2", "NetworkIn", "InstanceId"],
                                ["AWS/EC2", "NetworkOut", "InstanceId"]],
                "period": 300,
                "stat": "Average",
                "stacked": true,
                "view": "timeSeries"
            }
        },
        "CreateServiceDashboard": true
    }))
    .unwrap()
}

#[derive(Default)]
pub struct FakeDiscovery {
    pub pages: Vec<Value>,
    pub tags: BTreeMap<String, Vec<TagEntry>>,
    pub fail: bool,
}

impl FakeDiscovery {
    pub fn with_pages(pages: Vec<Value>) -> Self {
        FakeDiscovery {
            pages,
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, resource_ref: &str, tags: Vec<(&str, &str)>) -> Self {
        self.tags.insert(
            resource_ref.to_string(),
            tags.into_iter()
                .map(|(k, v)| TagEntry {
                    key: k.to_string(),
                    value: v.to_string(),
                })
                .collect(),
        );
        self
    }
}

#[async_trait]
impl DiscoveryClient for FakeDiscovery {
    async fn discover_pages(
        &self,
        _operation: &str,
        _filters: &[InstanceFilter],
    ) -> Result<Vec<Value>, anyhow::Error> {
        if self.fail {
            return Err(anyhow::anyhow!("discovery unavailable"));
        }
        Ok(self.pages.clone())
    }

    async fn lookup_tags(
        &self,
        _operation: &str,
        resource_ref: &str,
    ) -> Result<Vec<TagEntry>, anyhow::Error> {
        Ok(self.tags.get(resource_ref).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeAlarmApi {
    puts: Mutex<Vec<AlarmSpec>>,
    deletes: Mutex<Vec<Vec<String>>>,
    describes: Mutex<Vec<String>>,
    pages: Mutex<Vec<(Vec<AlarmRecord>, Option<String>)>>,
    /// Alarms returned for any describe call once the scripted pages run out.
    pub listing: Mutex<Vec<AlarmRecord>>,
}

impl FakeAlarmApi {
    pub fn with_pages(pages: Vec<(Vec<AlarmRecord>, Option<String>)>) -> Self {
        FakeAlarmApi {
            pages: Mutex::new(pages),
            ..Default::default()
        }
    }

    pub fn put_calls(&self) -> Vec<String> {
        self.puts
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.alarm_name.clone())
            .collect()
    }

    pub fn put_specs(&self) -> Vec<AlarmSpec> {
        self.puts.lock().unwrap().clone()
    }

    pub fn delete_batch_sizes(&self) -> Vec<usize> {
        self.deletes.lock().unwrap().iter().map(|b| b.len()).collect()
    }

    pub fn describe_calls(&self) -> usize {
        self.describes.lock().unwrap().len()
    }

    pub fn describe_prefixes(&self) -> Vec<String> {
        self.describes.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlarmApi for FakeAlarmApi {
    async fn put_metric_alarm(&self, spec: &AlarmSpec) -> Result<(), anyhow::Error> {
        self.puts.lock().unwrap().push(spec.clone());
        Ok(())
    }

    async fn describe_alarms_page(
        &self,
        prefix: &str,
        _next_token: Option<&str>,
    ) -> Result<AlarmPage, anyhow::Error> {
        self.describes.lock().unwrap().push(prefix.to_string());
        let mut pages = self.pages.lock().unwrap();
        if pages.is_empty() {
            // No scripted pages: answer from seeded records plus issued upserts.
            let mut alarms: Vec<AlarmRecord> = self.listing.lock().unwrap().clone();
            alarms.extend(self.puts.lock().unwrap().iter().map(|spec| AlarmRecord {
                alarm_name: spec.alarm_name.clone(),
                alarm_arn: format!("arn:fake:alarm:{}", spec.alarm_name),
                metric_name: spec.metric_name.clone(),
                dimensions: spec.dimensions.clone(),
            }));
            alarms.retain(|a| a.alarm_name.starts_with(prefix));
            return Ok(AlarmPage {
                alarms,
                next_token: None,
            });
        }
        let (alarms, next_token) = pages.remove(0);
        Ok(AlarmPage { alarms, next_token })
    }

    async fn delete_alarms(&self, names: &[String]) -> Result<(), anyhow::Error> {
        self.deletes.lock().unwrap().push(names.to_vec());
        Ok(())
    }
}

/// Hands out per-service fake discovery clients; unknown services are
/// unsupported, listed services with `failing` set return transport errors.
#[derive(Default)]
pub struct FakeDiscoveryFactory {
    pub pages: BTreeMap<String, Vec<Value>>,
    pub failing: Vec<String>,
}

impl FakeDiscoveryFactory {
    pub fn with_service(mut self, service: &str, pages: Vec<Value>) -> Self {
        self.pages.insert(service.to_string(), pages);
        self
    }

    pub fn with_failing(mut self, service: &str) -> Self {
        self.pages.insert(service.to_string(), vec![]);
        self.failing.push(service.to_string());
        self
    }
}

impl fw_defs::DiscoveryFactory for FakeDiscoveryFactory {
    fn client_for(
        &self,
        service: &str,
    ) -> Result<Box<dyn DiscoveryClient>, fw_defs::MonitorError> {
        match self.pages.get(service) {
            Some(pages) => Ok(Box::new(FakeDiscovery {
                pages: pages.clone(),
                tags: BTreeMap::new(),
                fail: self.failing.iter().any(|s| s == service),
            })),
            None => Err(fw_defs::MonitorError::UnsupportedService(
                service.to_string(),
            )),
        }
    }
}

#[derive(Default)]
pub struct FakeDashboardApi {
    puts: Mutex<Vec<(String, Value)>>,
    deletes: Mutex<Vec<Vec<String>>>,
}

impl FakeDashboardApi {
    pub fn put_pages(&self) -> Vec<(String, Value)> {
        self.puts.lock().unwrap().clone()
    }

    pub fn deleted_names(&self) -> Vec<Vec<String>> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl DashboardApi for FakeDashboardApi {
    async fn put_dashboard(&self, name: &str, body: &Value) -> Result<(), anyhow::Error> {
        let mut puts = self.puts.lock().unwrap();
        puts.retain(|(n, _)| n != name);
        puts.push((name.to_string(), body.clone()));
        Ok(())
    }

    async fn list_dashboards(&self, prefix: &str) -> Result<Vec<DashboardEntry>, anyhow::Error> {
        Ok(self
            .puts
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, _)| DashboardEntry {
                dashboard_name: name.clone(),
            })
            .collect())
    }

    async fn delete_dashboards(&self, names: &[String]) -> Result<(), anyhow::Error> {
        self.deletes.lock().unwrap().push(names.to_vec());
        self.puts
            .lock()
            .unwrap()
            .retain(|(name, _)| !names.contains(name));
        Ok(())
    }
}

pub struct FakeNotificationApi {
    topics: Vec<String>,
    published: Mutex<Vec<(String, String, String)>>,
}

impl FakeNotificationApi {
    pub fn with_topics(topics: &[&str]) -> Self {
        FakeNotificationApi {
            topics: topics.iter().map(|t| t.to_string()).collect(),
            published: Mutex::new(vec![]),
        }
    }

    pub fn published(&self) -> Vec<(String, String, String)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationApi for FakeNotificationApi {
    async fn list_topics(&self) -> Result<Vec<String>, anyhow::Error> {
        Ok(self.topics.clone())
    }

    async fn publish(
        &self,
        topic_arn: &str,
        subject: &str,
        message: &str,
    ) -> Result<String, anyhow::Error> {
        self.published.lock().unwrap().push((
            topic_arn.to_string(),
            subject.to_string(),
            message.to_string(),
        ));
        Ok(format!("msg-{}", self.published.lock().unwrap().len()))
    }
}

#[derive(Default)]
pub struct FakeSnapshotStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

#[async_trait]
impl SnapshotStore for FakeSnapshotStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>, anyhow::Error> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(&format!("{}/{}", bucket, key))
            .cloned())
    }

    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<u16, anyhow::Error> {
        self.objects
            .lock()
            .unwrap()
            .insert(format!("{}/{}", bucket, key), body);
        Ok(200)
    }
}
