//! Bean 注册表
//!
//! 实例只在 arena 中存放一次，key 到实例的映射保存的是稳定的 `BeanId`。
//! 同一个实例可以出现在多个 key 下（自身类型、别名、trait）。
//!
//! 两种写入方式：
//! - 独占注册：Bean 自身的名称或别名，key 已存在时失败
//! - 共享注册：trait key，多个实例可以共存，歧义推迟到读取时才报错

use std::collections::HashMap;
use std::sync::Arc;

use crate::bean::{BeanInstance, BeanRef, Resolution};
use crate::error::{ContainerError, ContainerResult};

/// arena 中的稳定下标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BeanId(usize);

impl BeanId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// 注册表
#[derive(Debug, Default)]
pub struct BeanRegistry {
    /// 实例存储，按注册顺序
    records: Vec<BeanInstance>,

    /// key -> 实例集合
    entries: HashMap<String, Vec<BeanId>>,
}

impl BeanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 独占注册：key 已有任何条目时返回 `BeanAlreadyDefined`，原条目保持不变
    pub fn register_exclusive(
        &mut self,
        key: impl Into<String>,
        instance: BeanInstance,
    ) -> ContainerResult<BeanId> {
        let key = key.into();
        if self.entries.contains_key(&key) {
            tracing::warn!("Bean '{}' already exists, registration failed", key);
            return Err(ContainerError::BeanAlreadyDefined { key });
        }

        let id = BeanId(self.records.len());
        tracing::debug!(
            "Registering bean of type {} with name {}",
            instance.type_name(),
            key
        );
        self.records.push(instance);
        self.entries.insert(key, vec![id]);
        Ok(id)
    }

    /// 共享注册：追加到已有条目，同一实例不会重复加入
    ///
    /// `id` 不属于本注册表时返回 `UnknownBeanId`，不写入任何条目。
    pub fn register_shared(&mut self, key: impl Into<String>, id: BeanId) -> ContainerResult<()> {
        let key = key.into();
        let Some(record) = self.records.get(id.0) else {
            return Err(ContainerError::UnknownBeanId { id: id.0, key });
        };
        tracing::debug!(
            "Registering bean of type {} with name {}",
            record.type_name(),
            key
        );

        let ids = self.entries.entry(key).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
        Ok(())
    }

    /// 按类型解析，key 为 `type_name::<T>()`
    pub fn resolve_by_type<T: ?Sized + 'static>(&self) -> ContainerResult<Arc<T>> {
        self.resolve_key::<T>(std::any::type_name::<T>())
    }

    /// 按显式名称解析，仍要求实例可赋值给 `T`
    pub fn resolve_by_name_and_type<T: ?Sized + 'static>(
        &self,
        name: &str,
    ) -> ContainerResult<Arc<T>> {
        self.resolve_key::<T>(name)
    }

    /// 按给定的解析方式解析
    pub fn resolve<T: ?Sized + 'static>(
        &self,
        resolution: Resolution<'_>,
    ) -> ContainerResult<Arc<T>> {
        match resolution {
            Resolution::ByName(name) => self.resolve_by_name_and_type::<T>(name),
            Resolution::ByType => self.resolve_by_type::<T>(),
        }
    }

    fn resolve_key<T: ?Sized + 'static>(&self, key: &str) -> ContainerResult<Arc<T>> {
        let requested = std::any::type_name::<T>();
        let no_suitable = || ContainerError::NoSuitableBean {
            key: key.to_string(),
            requested: requested.to_string(),
        };

        let ids = self.entries.get(key).ok_or_else(|| {
            tracing::debug!("Bean '{}' not found in container", key);
            no_suitable()
        })?;

        let mut candidates: Vec<(&BeanInstance, Arc<T>)> = ids
            .iter()
            .filter_map(|id| {
                let record = &self.records[id.0];
                record.view::<T>().map(|view| (record, view))
            })
            .collect();

        match candidates.len() {
            0 => {
                tracing::debug!(
                    "No bean under '{}' is assignable to {}",
                    key,
                    requested
                );
                Err(no_suitable())
            }
            1 => Ok(candidates.remove(0).1),
            _ => Err(ContainerError::BeanConflict {
                key: key.to_string(),
                candidates: candidates
                    .iter()
                    .map(|(record, _)| record.type_name().to_string())
                    .collect(),
            }),
        }
    }

    /// 所有不同的实例，每个实例只出现一次，按注册顺序
    pub fn distinct_instances(&self) -> impl Iterator<Item = (BeanId, &BeanInstance)> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| (BeanId(index), record))
    }

    /// 取出某个实例记录
    pub fn get(&self, id: BeanId) -> Option<&BeanInstance> {
        self.records.get(id.0)
    }

    /// 某个 key 下的实例 id
    pub fn ids_for(&self, key: &str) -> &[BeanId] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// key -> 实例 的快照，用于诊断和测试
    pub fn snapshot(&self) -> HashMap<String, Vec<BeanRef>> {
        self.entries
            .iter()
            .map(|(key, ids)| {
                let instances = ids
                    .iter()
                    .map(|id| Arc::clone(self.records[id.0].instance()))
                    .collect();
                (key.clone(), instances)
            })
            .collect()
    }

    /// 所有 key
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    pub fn bean_count(&self) -> usize {
        self.records.len()
    }
}
