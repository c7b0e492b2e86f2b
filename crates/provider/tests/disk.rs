mod common;

use bcc_common::{Disk, EntityRef, Vm};
use bcc_provider::resources::disk::DiskResource;
use bcc_provider::resources::Resource;
use bcc_provider::state::{int_value, make_state, string_value, DynamicValue};
use bcc_provider::ResourceData;
use common::FakeManager;

fn disk_config(name: &str, size: i64, profile: &str) -> DynamicValue {
    make_state(vec![
        ("name", string_value(name)),
        ("size", int_value(size)),
        ("storage_profile_id", string_value(profile)),
        ("vdc_id", string_value("vdc-1")),
        ("tags", vec!["db", "prod"].into()),
    ])
}

fn stored_disk(fake: &FakeManager, id: &str) -> Disk {
    fake.world
        .lock()
        .unwrap()
        .disks
        .iter()
        .find(|d| d.id == id)
        .cloned()
        .unwrap()
}

#[tokio::test]
async fn create_waits_for_locks_and_reads_back() {
    let fake = FakeManager::with_vdc();
    fake.lock_for("vdc-1", 2);

    let mut d = ResourceData::new(disk_config("data", 20, "sp-ssd"));
    DiskResource::create(&fake, &mut d).await.unwrap();

    assert!(d.id().starts_with("disk-"));
    assert_eq!(d.get_int("size"), 20);
    assert_eq!(d.get_string("storage_profile_id"), "sp-ssd");
    assert!(!d.get_string("external_id").is_empty());
    assert_eq!(d.get_string_list("tags"), vec!["db", "prod"]);

    assert_eq!(fake.remaining_lock("vdc-1"), 0);
    assert_eq!(fake.calls_to("create_disk").len(), 1);
    let calls = fake.calls();
    let last_vdc_poll = calls.iter().rposition(|c| c == "is_locked:vdc-1").unwrap();
    let create = calls.iter().position(|c| c.starts_with("create_disk")).unwrap();
    assert!(last_vdc_poll < create);
}

#[tokio::test]
async fn create_with_unknown_profile_makes_no_disk() {
    let fake = FakeManager::with_vdc();

    let mut d = ResourceData::new(disk_config("data", 20, "sp-nvme"));
    let err = DiskResource::create(&fake, &mut d).await.unwrap_err();

    let message = format!("{:#}", err);
    assert!(message.starts_with("storage_profile: Error getting storage profile"));
    assert!(message.contains("ERROR: Storage profile with id 'sp-nvme' not found"));
    assert!(fake.calls_to("create_disk").is_empty());
    assert!(d.id().is_empty());
}

#[tokio::test]
async fn read_of_missing_disk_clears_identity() {
    let fake = FakeManager::with_vdc();

    let mut d = ResourceData::from_id("disk-gone");
    DiskResource::read(&fake, &mut d).await.unwrap();

    assert!(d.id().is_empty());
    assert!(d.into_state().is_null());
}

#[tokio::test]
async fn read_without_identity_calls_nothing() {
    let fake = FakeManager::with_vdc();

    let mut d = ResourceData::new(disk_config("data", 20, "sp-ssd"));
    DiskResource::read(&fake, &mut d).await.unwrap();

    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn update_uses_specialized_calls_in_order() {
    let fake = FakeManager::with_vdc();
    let mut d = ResourceData::new(disk_config("data", 10, "sp-hdd"));
    DiskResource::create(&fake, &mut d).await.unwrap();
    let id = d.id().to_string();
    let prior = d.to_value();
    fake.clear_calls();

    let mut planned = disk_config("data-renamed", 30, "sp-ssd");
    if let DynamicValue::Map(m) = &mut planned {
        m.insert("id".into(), string_value(&id));
    }
    let mut d = ResourceData::with_prior(prior, planned);
    DiskResource::update(&fake, &mut d).await.unwrap();

    let mutations: Vec<String> = fake
        .calls()
        .into_iter()
        .filter(|c| {
            c.starts_with("resize_disk") || c.starts_with("update_disk_storage_profile") || c.starts_with("update_disk:")
        })
        .collect();
    assert_eq!(
        mutations,
        vec![
            format!("resize_disk:{}:30", id),
            format!("update_disk_storage_profile:{}:sp-ssd", id),
            format!("update_disk:{}", id),
        ]
    );

    let stored = stored_disk(&fake, &id);
    assert_eq!(stored.name, "data-renamed");
    assert_eq!(stored.size, 30);
    assert_eq!(stored.storage_profile.id, "sp-ssd");
    assert_eq!(d.get_int("size"), 30);
}

#[tokio::test]
async fn update_of_size_alone_skips_generic_update() {
    let fake = FakeManager::with_vdc();
    let mut d = ResourceData::new(disk_config("data", 10, "sp-ssd"));
    DiskResource::create(&fake, &mut d).await.unwrap();
    let id = d.id().to_string();
    let prior = d.to_value();
    fake.clear_calls();

    let mut planned = prior.clone();
    if let DynamicValue::Map(m) = &mut planned {
        m.insert("size".into(), int_value(15));
    }
    let mut d = ResourceData::with_prior(prior, planned);
    DiskResource::update(&fake, &mut d).await.unwrap();

    assert_eq!(fake.calls_to("resize_disk"), vec![format!("resize_disk:{}:15", id)]);
    assert!(fake.calls_to("update_disk").is_empty());
    assert!(fake.calls_to("update_disk_storage_profile").is_empty());
}

#[tokio::test]
async fn delete_detaches_from_vm_first() {
    let fake = FakeManager::with_vdc();
    {
        let mut world = fake.world.lock().unwrap();
        world.disks.push(Disk {
            id: "disk-1".into(),
            name: "data".into(),
            size: 10,
            storage_profile: EntityRef::new("sp-ssd"),
            vdc: EntityRef::new("vdc-1"),
            vm: Some(EntityRef::new("vm-1")),
            ..Disk::default()
        });
        world.vms.push((
            "vdc-1".into(),
            Vm {
                id: "vm-1".into(),
                name: "web".into(),
                cpu: 2,
                ram: 4.0,
                disks: vec![EntityRef::new("disk-1")],
                ..Vm::default()
            },
        ));
    }

    let mut d = ResourceData::from_id("disk-1");
    DiskResource::delete(&fake, &mut d).await.unwrap();

    let calls = fake.calls();
    let detach = calls.iter().position(|c| c == "detach_disk:vm-1:disk-1").unwrap();
    let delete = calls.iter().position(|c| c == "delete_disk:disk-1").unwrap();
    assert!(detach < delete);
    assert!(d.id().is_empty());
    assert!(fake.world.lock().unwrap().disks.is_empty());
}

#[tokio::test]
async fn import_reads_vdc_back() {
    let fake = FakeManager::with_vdc();
    let mut d = ResourceData::new(disk_config("data", 10, "sp-ssd"));
    DiskResource::create(&fake, &mut d).await.unwrap();
    let id = d.id().to_string();

    let mut imported = ResourceData::from_id(&id);
    DiskResource::import(&fake, &mut imported).await.unwrap();

    assert_eq!(imported.get_string("vdc_id"), "vdc-1");
    assert_eq!(imported.get_string("name"), "data");
}
