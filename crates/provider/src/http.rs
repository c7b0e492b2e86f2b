//! JSON REST implementation of [`Manager`]

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use bcc_common::*;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::client::{LockTarget, Manager};
use crate::config::ProviderConfig;

/// One page of a list endpoint. Older endpoints return a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum Page<T> {
    Bare(Vec<T>),
    Paged {
        results: Vec<T>,
        #[serde(default)]
        next: Option<String>,
    },
}

/// Upper bound on pages fetched by one list call
const MAX_PAGES: usize = 1000;

/// Next page to fetch, or `None` when the listing is complete. A link that
/// was already visited or a listing past [`MAX_PAGES`] ends the walk.
fn next_page(visited: &mut HashSet<String>, next: Option<String>) -> Option<String> {
    let next = next.filter(|n| !n.is_empty())?;
    if visited.len() >= MAX_PAGES {
        warn!("Stopping list after {} pages", MAX_PAGES);
        return None;
    }
    if !visited.insert(next.clone()) {
        warn!("List page {} was already fetched, stopping", next);
        return None;
    }
    Some(next)
}

/// Management API client over HTTPS
pub struct HttpManager {
    client: reqwest::Client,
    base_url: String,
    token: String,
    poll_interval: Duration,
}

impl HttpManager {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("bcc-provider/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.api_endpoint.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            poll_interval: config.lock_poll_interval(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url).bearer_auth(&self.token)
    }

    /// Send a request and map non-2xx statuses; `kind`/`id` name the target for 404s
    async fn execute(&self, req: RequestBuilder, kind: EntityKind, id: &str) -> Result<reqwest::Response> {
        let response = req.send().await.map_err(|e| Error::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(Error::from_status(status.as_u16(), message, &kind.to_string(), id))
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let bytes = response.bytes().await.map_err(|e| Error::Transport(e.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, kind: EntityKind, id: &str) -> Result<T> {
        debug!("GET {}", path);
        let response = self.execute(self.request(Method::GET, &self.url(path)), kind, id).await?;
        Self::decode(response).await
    }

    /// Fetch every page of a list endpoint
    async fn list<T: DeserializeOwned>(&self, path: &str, kind: EntityKind) -> Result<Vec<T>> {
        debug!("LIST {}", path);
        let mut url = self.url(path);
        let mut visited = HashSet::from([url.clone()]);
        let mut items = Vec::new();
        loop {
            let response = self.execute(self.request(Method::GET, &url), kind, "").await?;
            match Self::decode::<Page<T>>(response).await? {
                Page::Bare(page) => {
                    items.extend(page);
                    return Ok(items);
                }
                Page::Paged { results, next } => {
                    items.extend(results);
                    match next_page(&mut visited, next) {
                        Some(next) => url = next,
                        None => return Ok(items),
                    }
                }
            }
        }
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        kind: EntityKind,
        id: &str,
    ) -> Result<T> {
        debug!("{} {}", method, path);
        let req = self.request(method, &self.url(path)).json(body);
        let response = self.execute(req, kind, id).await?;
        Self::decode(response).await
    }

    /// Like [`send_json`](Self::send_json) for endpoints whose body is ignored
    async fn send_unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        kind: EntityKind,
        id: &str,
    ) -> Result<()> {
        debug!("{} {}", method, path);
        let req = self.request(method, &self.url(path)).json(body);
        self.execute(req, kind, id).await?;
        Ok(())
    }

    async fn delete(&self, path: &str, kind: EntityKind, id: &str) -> Result<()> {
        debug!("DELETE {}", path);
        self.execute(self.request(Method::DELETE, &self.url(path)), kind, id).await?;
        Ok(())
    }
}

#[async_trait]
impl Manager for HttpManager {
    fn lock_poll_interval(&self) -> Duration {
        self.poll_interval
    }

    async fn is_locked(&self, target: LockTarget<'_>) -> Result<bool> {
        match target {
            LockTarget::Vdc(id) => Ok(self.get_vdc(id).await?.locked),
            LockTarget::Disk(id) => Ok(self.get_disk(id).await?.locked),
            LockTarget::Network(id) => Ok(self.get_network(id).await?.locked),
        }
    }

    async fn get_project(&self, id: &str) -> Result<Project> {
        self.get(&format!("/v1/project/{}", id), EntityKind::Project, id).await
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.list("/v1/project", EntityKind::Project).await
    }

    async fn get_vdc(&self, id: &str) -> Result<Vdc> {
        self.get(&format!("/v1/vdc/{}", id), EntityKind::Vdc, id).await
    }

    async fn list_vdcs(&self) -> Result<Vec<Vdc>> {
        self.list("/v1/vdc", EntityKind::Vdc).await
    }

    async fn list_storage_profiles(&self, vdc_id: &str) -> Result<Vec<StorageProfile>> {
        self.list(&format!("/v1/vdc/{}/storage_profile", vdc_id), EntityKind::StorageProfile)
            .await
    }

    async fn list_hypervisors(&self, project_id: &str) -> Result<Vec<Hypervisor>> {
        self.list(&format!("/v1/project/{}/limits/hypervisors", project_id), EntityKind::Hypervisor)
            .await
    }

    async fn get_disk(&self, id: &str) -> Result<Disk> {
        self.get(&format!("/v1/disk/{}", id), EntityKind::Disk, id).await
    }

    async fn list_disks(&self, vdc_id: &str) -> Result<Vec<Disk>> {
        self.list(&format!("/v1/disk?vdc={}", vdc_id), EntityKind::Disk).await
    }

    async fn create_disk(&self, vdc_id: &str, disk: &NewDisk) -> Result<Disk> {
        let body = json!({
            "vdc": vdc_id,
            "name": disk.name,
            "size": disk.size,
            "storage_profile": disk.storage_profile,
            "tags": disk.tags,
        });
        self.send_json(Method::POST, "/v1/disk", &body, EntityKind::Disk, "")
            .await
    }

    async fn update_disk(&self, disk: &Disk) -> Result<Disk> {
        let body = json!({ "name": disk.name, "tags": disk.tags });
        self.send_json(Method::PUT, &format!("/v1/disk/{}", disk.id), &body, EntityKind::Disk, &disk.id)
            .await
    }

    async fn resize_disk(&self, id: &str, size: i64) -> Result<()> {
        let body = json!({ "size": size });
        self.send_unit(Method::PUT, &format!("/v1/disk/{}", id), &body, EntityKind::Disk, id)
            .await
    }

    async fn update_disk_storage_profile(&self, id: &str, storage_profile_id: &str) -> Result<()> {
        let body = json!({ "storage_profile": storage_profile_id });
        self.send_unit(Method::PUT, &format!("/v1/disk/{}", id), &body, EntityKind::Disk, id)
            .await
    }

    async fn delete_disk(&self, id: &str) -> Result<()> {
        self.delete(&format!("/v1/disk/{}", id), EntityKind::Disk, id).await
    }

    async fn get_vm(&self, id: &str) -> Result<Vm> {
        self.get(&format!("/v1/vm/{}", id), EntityKind::Vm, id).await
    }

    async fn list_vms(&self, vdc_id: &str) -> Result<Vec<Vm>> {
        self.list(&format!("/v1/vm?vdc={}", vdc_id), EntityKind::Vm).await
    }

    async fn detach_disk(&self, vm_id: &str, disk_id: &str) -> Result<()> {
        let body = json!({ "disk": disk_id });
        self.send_unit(Method::POST, &format!("/v1/vm/{}/detach_disk", vm_id), &body, EntityKind::Vm, vm_id)
            .await
    }

    async fn list_templates(&self, vdc_id: &str) -> Result<Vec<Template>> {
        self.list(&format!("/v1/template?vdc={}", vdc_id), EntityKind::Template)
            .await
    }

    async fn get_template(&self, id: &str) -> Result<Template> {
        self.get(&format!("/v1/template/{}", id), EntityKind::Template, id).await
    }

    async fn get_network(&self, id: &str) -> Result<Network> {
        self.get(&format!("/v1/network/{}", id), EntityKind::Network, id).await
    }

    async fn list_networks(&self, vdc_id: &str) -> Result<Vec<Network>> {
        self.list(&format!("/v1/network?vdc={}", vdc_id), EntityKind::Network)
            .await
    }

    async fn create_network(&self, vdc_id: &str, network: &NewNetwork) -> Result<Network> {
        let body = json!({
            "vdc": vdc_id,
            "name": network.name,
            "mtu": network.mtu,
            "tags": network.tags,
        });
        self.send_json(Method::POST, "/v1/network", &body, EntityKind::Network, "")
            .await
    }

    async fn update_network(&self, network: &Network) -> Result<Network> {
        let body = json!({ "name": network.name, "mtu": network.mtu, "tags": network.tags });
        self.send_json(
            Method::PUT,
            &format!("/v1/network/{}", network.id),
            &body,
            EntityKind::Network,
            &network.id,
        )
        .await
    }

    async fn delete_network(&self, id: &str) -> Result<()> {
        self.delete(&format!("/v1/network/{}", id), EntityKind::Network, id).await
    }

    async fn list_subnets(&self, network_id: &str) -> Result<Vec<Subnet>> {
        self.list(&format!("/v1/network/{}/subnet", network_id), EntityKind::Subnet)
            .await
    }

    async fn create_subnet(&self, network_id: &str, subnet: &NewSubnet) -> Result<Subnet> {
        self.send_json(
            Method::POST,
            &format!("/v1/network/{}/subnet", network_id),
            subnet,
            EntityKind::Subnet,
            "",
        )
        .await
    }

    async fn update_subnet(&self, network_id: &str, subnet: &Subnet) -> Result<()> {
        let body = json!({
            "cidr": subnet.cidr,
            "gateway": subnet.gateway,
            "start_ip": subnet.start_ip,
            "end_ip": subnet.end_ip,
            "is_dhcp": subnet.is_dhcp,
        });
        self.send_unit(
            Method::PUT,
            &format!("/v1/network/{}/subnet/{}", network_id, subnet.id),
            &body,
            EntityKind::Subnet,
            &subnet.id,
        )
        .await
    }

    async fn update_subnet_dns(&self, network_id: &str, subnet_id: &str, dns: &[String]) -> Result<()> {
        let body = json!({ "dns_servers": dns });
        self.send_unit(
            Method::PUT,
            &format!("/v1/network/{}/subnet/{}/dns", network_id, subnet_id),
            &body,
            EntityKind::Subnet,
            subnet_id,
        )
        .await
    }

    async fn delete_subnet(&self, network_id: &str, subnet_id: &str) -> Result<()> {
        self.delete(
            &format!("/v1/network/{}/subnet/{}", network_id, subnet_id),
            EntityKind::Subnet,
            subnet_id,
        )
        .await
    }

    async fn get_firewall_template(&self, id: &str) -> Result<FirewallTemplate> {
        self.get(&format!("/v1/firewall_template/{}", id), EntityKind::FirewallTemplate, id)
            .await
    }

    async fn list_firewall_templates(&self, vdc_id: &str) -> Result<Vec<FirewallTemplate>> {
        self.list(
            &format!("/v1/firewall_template?vdc={}", vdc_id),
            EntityKind::FirewallTemplate,
        )
        .await
    }

    async fn create_firewall_template(
        &self,
        vdc_id: &str,
        name: &str,
        tags: &[Tag],
    ) -> Result<FirewallTemplate> {
        let body = json!({ "vdc": vdc_id, "name": name, "tags": tags });
        self.send_json(
            Method::POST,
            "/v1/firewall_template",
            &body,
            EntityKind::FirewallTemplate,
            "",
        )
        .await
    }

    async fn update_firewall_template(&self, template: &FirewallTemplate) -> Result<FirewallTemplate> {
        let body = json!({ "name": template.name, "tags": template.tags });
        self.send_json(
            Method::PUT,
            &format!("/v1/firewall_template/{}", template.id),
            &body,
            EntityKind::FirewallTemplate,
            &template.id,
        )
        .await
    }

    async fn delete_firewall_template(&self, id: &str) -> Result<()> {
        self.delete(&format!("/v1/firewall_template/{}", id), EntityKind::FirewallTemplate, id)
            .await
    }

    async fn get_load_balancer(&self, id: &str) -> Result<LoadBalancer> {
        self.get(&format!("/v1/lbaas/{}", id), EntityKind::LoadBalancer, id).await
    }

    async fn list_load_balancers(&self, vdc_id: &str) -> Result<Vec<LoadBalancer>> {
        self.list(&format!("/v1/lbaas?vdc={}", vdc_id), EntityKind::LoadBalancer)
            .await
    }

    async fn get_port(&self, id: &str) -> Result<Port> {
        self.get(&format!("/v1/port/{}", id), EntityKind::Port, id).await
    }

    async fn list_ports(&self, vdc_id: &str) -> Result<Vec<Port>> {
        self.list(&format!("/v1/port?vdc={}", vdc_id), EntityKind::Port).await
    }

    async fn get_router(&self, id: &str) -> Result<Router> {
        self.get(&format!("/v1/router/{}", id), EntityKind::Router, id).await
    }

    async fn list_routers(&self, vdc_id: &str) -> Result<Vec<Router>> {
        self.list(&format!("/v1/router?vdc={}", vdc_id), EntityKind::Router).await
    }

    async fn get_public_key(&self, id: &str) -> Result<PublicKey> {
        self.get(&format!("/v1/account/key/{}", id), EntityKind::PublicKey, id)
            .await
    }

    async fn list_public_keys(&self, account_id: &str) -> Result<Vec<PublicKey>> {
        self.list(&format!("/v1/account/{}/key", account_id), EntityKind::PublicKey)
            .await
    }

    async fn get_s3_storage(&self, id: &str) -> Result<S3Storage> {
        self.get(&format!("/v1/s3_storage/{}", id), EntityKind::S3Storage, id)
            .await
    }

    async fn list_s3_storages(&self, project_id: &str) -> Result<Vec<S3Storage>> {
        self.list(&format!("/v1/s3_storage?project={}", project_id), EntityKind::S3Storage)
            .await
    }

    async fn get_bucket(&self, storage_id: &str, id: &str) -> Result<S3StorageBucket> {
        self.get(
            &format!("/v1/s3_storage/{}/bucket/{}", storage_id, id),
            EntityKind::S3StorageBucket,
            id,
        )
        .await
    }

    async fn create_bucket(&self, storage_id: &str, name: &str) -> Result<S3StorageBucket> {
        let body = json!({ "name": name });
        self.send_json(
            Method::POST,
            &format!("/v1/s3_storage/{}/bucket", storage_id),
            &body,
            EntityKind::S3StorageBucket,
            "",
        )
        .await
    }

    async fn update_bucket(&self, storage_id: &str, bucket: &S3StorageBucket) -> Result<S3StorageBucket> {
        let body = json!({ "name": bucket.name });
        self.send_json(
            Method::PUT,
            &format!("/v1/s3_storage/{}/bucket/{}", storage_id, bucket.id),
            &body,
            EntityKind::S3StorageBucket,
            &bucket.id,
        )
        .await
    }

    async fn delete_bucket(&self, storage_id: &str, id: &str) -> Result<()> {
        self.delete(
            &format!("/v1/s3_storage/{}/bucket/{}", storage_id, id),
            EntityKind::S3StorageBucket,
            id,
        )
        .await
    }

    async fn get_dns(&self, id: &str) -> Result<Dns> {
        self.get(&format!("/v1/dns/{}", id), EntityKind::Dns, id).await
    }

    async fn list_dns(&self, project_id: &str) -> Result<Vec<Dns>> {
        self.list(&format!("/v1/dns?project={}", project_id), EntityKind::Dns)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_accepts_both_shapes() {
        let bare: Page<StorageProfile> =
            serde_json::from_str(r#"[{"id": "sp-1", "name": "ssd"}]"#).unwrap();
        assert!(matches!(bare, Page::Bare(ref items) if items.len() == 1));

        let paged: Page<StorageProfile> = serde_json::from_str(
            r#"{"results": [{"id": "sp-1", "name": "ssd"}], "next": null}"#,
        )
        .unwrap();
        match paged {
            Page::Paged { results, next } => {
                assert_eq!(results[0].name, "ssd");
                assert!(next.is_none());
            }
            Page::Bare(_) => panic!("expected a paged response"),
        }
    }

    #[test]
    fn test_next_page_stops_on_repeated_link() {
        let first = "https://cloud.example.com/v1/disks".to_string();
        let second = format!("{}?page=2", first);
        let mut visited = HashSet::from([first.clone()]);

        assert_eq!(next_page(&mut visited, Some(second.clone())), Some(second.clone()));
        assert_eq!(next_page(&mut visited, Some(second)), None);
        assert_eq!(next_page(&mut visited, Some(first)), None);
        assert_eq!(next_page(&mut visited, Some(String::new())), None);
        assert_eq!(next_page(&mut visited, None), None);
    }

    #[test]
    fn test_next_page_caps_page_count() {
        let mut visited: HashSet<String> = (0..MAX_PAGES).map(|i| format!("page-{}", i)).collect();
        assert_eq!(next_page(&mut visited, Some("page-new".to_string())), None);
    }

    #[test]
    fn test_new_trims_base_url() {
        let config = ProviderConfig {
            api_endpoint: "https://cloud.example.com/".to_string(),
            token: "t".to_string(),
            ..ProviderConfig::default()
        };
        let manager = HttpManager::new(&config).unwrap();
        assert_eq!(manager.url("/v1/disk"), "https://cloud.example.com/v1/disk");
        assert_eq!(manager.lock_poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_new_rejects_missing_endpoint() {
        let result = HttpManager::new(&ProviderConfig::default());
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
