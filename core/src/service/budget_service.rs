use crate::error::BudgetError;
use crate::model::budget::{Category, GoalDirection, Subcategory};
use crate::repository::CategoryRepository;
use anyhow::Result;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Partial update for an activity. `goal_direction: Some(None)` resets to target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubcategoryUpdate {
    pub name: Option<String>,
    pub budget: Option<f64>,
    pub goal_direction: Option<Option<GoalDirection>>,
}

pub struct BudgetService<R: CategoryRepository> {
    repo: R,
}

impl<R: CategoryRepository> BudgetService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list(&self) -> Result<Vec<Category>> {
        let mut categories = self.repo.list()?;
        categories.sort_by_key(|c| c.position);
        for cat in categories.iter_mut() {
            cat.subcategories.sort_by_key(|s| s.position);
        }
        Ok(categories)
    }

    pub fn get(&self, id: &Uuid) -> Result<Category> {
        self.repo.get(id)
    }

    // Categories

    pub fn add_category(&self, name: &str) -> Result<Category> {
        let name = clean_name(name)?;
        let categories = self.repo.list()?;
        if categories.iter().any(|c| same_name(&c.name, &name)) {
            return Err(BudgetError::DuplicateName(name).into());
        }

        let mut category = Category::new(name);
        category.position = categories.len();
        let created = self.repo.create(category)?;
        info!(category = %created.name, "added category");
        Ok(created)
    }

    pub fn rename_category(&self, id: &Uuid, name: &str) -> Result<Category> {
        let name = clean_name(name)?;
        let categories = self.repo.list()?;
        if categories.iter().any(|c| c.id != *id && same_name(&c.name, &name)) {
            return Err(BudgetError::DuplicateName(name).into());
        }

        let mut category = self.repo.get(id)?;
        info!(from = %category.name, to = %name, "renamed category");
        category.name = name;
        self.repo.update(&category)?;
        Ok(category)
    }

    pub fn remove_category(&self, id: &Uuid) -> Result<Category> {
        let category = self.repo.get(id)?;
        self.repo.delete(id)?;

        let mut rest = self.repo.list()?;
        renumber(&mut rest);
        self.repo.save_all(&rest)?;
        info!(category = %category.name, "removed category");
        Ok(category)
    }

    /// Move a category `delta` places (negative is up). Returns the new index.
    pub fn move_category(&self, id: &Uuid, delta: i64) -> Result<usize> {
        let mut categories = self.list()?;
        let from = categories
            .iter()
            .position(|c| c.id == *id)
            .ok_or_else(|| BudgetError::CategoryNotFound(id.to_string()))?;
        let to = shifted_index(from, delta, categories.len());

        let moved = categories.remove(from);
        categories.insert(to, moved);
        renumber(&mut categories);
        self.repo.save_all(&categories)?;
        debug!(from, to, "moved category");
        Ok(to)
    }

    pub fn find_category(&self, query: &str) -> Result<Category> {
        let categories = self.list()?;
        let found = resolve(&categories, query, |c| &c.name, |c| c.id)
            .map_err(|e| e.or_not_found(BudgetError::CategoryNotFound(query.to_string())))?;
        Ok(found.clone())
    }

    // Subcategories (activities)

    pub fn add_subcategory(
        &self,
        category_id: &Uuid,
        name: &str,
        budget: f64,
        goal_direction: Option<GoalDirection>,
    ) -> Result<Subcategory> {
        let name = clean_name(name)?;
        check_budget(budget)?;

        let mut category = self.repo.get(category_id)?;
        if category.subcategories.iter().any(|s| same_name(&s.name, &name)) {
            return Err(BudgetError::DuplicateName(format!("{}/{}", category.name, name)).into());
        }

        let mut sub = Subcategory::new(name, budget, goal_direction);
        sub.position = category.subcategories.len();
        category.subcategories.push(sub.clone());
        self.repo.update(&category)?;
        info!(category = %category.name, activity = %sub.name, budget, "added activity");
        Ok(sub)
    }

    pub fn update_subcategory(
        &self,
        category_id: &Uuid,
        sub_id: &Uuid,
        update: SubcategoryUpdate,
    ) -> Result<Subcategory> {
        let mut category = self.repo.get(category_id)?;

        if let Some(name) = &update.name {
            let name = clean_name(name)?;
            if category.subcategories.iter().any(|s| s.id != *sub_id && same_name(&s.name, &name)) {
                return Err(BudgetError::DuplicateName(format!("{}/{}", category.name, name)).into());
            }
        }
        if let Some(budget) = update.budget {
            check_budget(budget)?;
        }

        let sub = category
            .subcategory_mut(sub_id)
            .ok_or_else(|| BudgetError::SubcategoryNotFound(sub_id.to_string()))?;
        if let Some(name) = update.name {
            sub.name = clean_name(&name)?;
        }
        if let Some(budget) = update.budget {
            sub.budget = budget;
        }
        if let Some(direction) = update.goal_direction {
            sub.goal_direction = direction;
        }
        let updated = sub.clone();

        self.repo.update(&category)?;
        info!(category = %category.name, activity = %updated.name, "updated activity");
        Ok(updated)
    }

    pub fn remove_subcategory(&self, category_id: &Uuid, sub_id: &Uuid) -> Result<Subcategory> {
        let mut category = self.repo.get(category_id)?;
        let index = category
            .subcategories
            .iter()
            .position(|s| s.id == *sub_id)
            .ok_or_else(|| BudgetError::SubcategoryNotFound(sub_id.to_string()))?;

        let removed = category.subcategories.remove(index);
        category.normalize_positions();
        self.repo.update(&category)?;
        info!(category = %category.name, activity = %removed.name, "removed activity");
        Ok(removed)
    }

    /// Move an activity `delta` places within its category. Returns the new index.
    pub fn move_subcategory(&self, category_id: &Uuid, sub_id: &Uuid, delta: i64) -> Result<usize> {
        let mut category = self.repo.get(category_id)?;
        category.normalize_positions();
        let from = category
            .subcategories
            .iter()
            .position(|s| s.id == *sub_id)
            .ok_or_else(|| BudgetError::SubcategoryNotFound(sub_id.to_string()))?;
        let to = shifted_index(from, delta, category.subcategories.len());

        let moved = category.subcategories.remove(from);
        category.subcategories.insert(to, moved);
        for (i, sub) in category.subcategories.iter_mut().enumerate() {
            sub.position = i;
        }
        self.repo.update(&category)?;
        debug!(from, to, "moved activity");
        Ok(to)
    }

    /// Resolve `"Category/Activity"` to ids.
    pub fn resolve_path(&self, path: &str) -> Result<(Category, Subcategory)> {
        let (cat_query, sub_query) = path
            .split_once('/')
            .ok_or_else(|| BudgetError::SubcategoryNotFound(path.to_string()))?;
        let category = self.find_category(cat_query)?;
        let sub = find_subcategory(&category, sub_query)?.clone();
        Ok((category, sub))
    }

    /// Overwrite `time_used` from freshly aggregated usage. Activities absent
    /// from `usage` had nothing logged and drop to zero.
    pub fn apply_usage(&self, usage: &HashMap<Uuid, f64>) -> Result<()> {
        let mut categories = self.repo.list()?;
        let mut changed = false;
        for cat in categories.iter_mut() {
            for sub in cat.subcategories.iter_mut() {
                let used = usage.get(&sub.id).copied().unwrap_or(0.0);
                if (sub.time_used - used).abs() > f64::EPSILON {
                    sub.time_used = used;
                    changed = true;
                }
            }
        }
        if changed {
            self.repo.save_all(&categories)?;
            debug!("refreshed weekly usage");
        }
        Ok(())
    }
}

pub fn find_subcategory<'a>(category: &'a Category, query: &str) -> Result<&'a Subcategory> {
    resolve(&category.subcategories, query, |s| &s.name, |s| s.id).map_err(|e| {
        e.or_not_found(BudgetError::SubcategoryNotFound(format!("{}/{}", category.name, query)))
            .into()
    })
}

enum Lookup {
    Missing,
    Ambiguous(BudgetError),
}

impl Lookup {
    fn or_not_found(self, not_found: BudgetError) -> BudgetError {
        match self {
            Lookup::Missing => not_found,
            Lookup::Ambiguous(err) => err,
        }
    }
}

/// Exact name (case-insensitive), then unique name prefix, then unique id prefix.
fn resolve<'a, T>(
    items: &'a [T],
    query: &str,
    name: impl Fn(&T) -> &String,
    id: impl Fn(&T) -> Uuid,
) -> std::result::Result<&'a T, Lookup> {
    let query = query.trim();
    if query.is_empty() {
        return Err(Lookup::Missing);
    }
    if let Some(item) = items.iter().find(|i| same_name(name(*i), query)) {
        return Ok(item);
    }

    let lower = query.to_lowercase();
    let by_prefix: Vec<&T> = items
        .iter()
        .filter(|i| name(*i).to_lowercase().starts_with(&lower))
        .collect();
    match by_prefix.len() {
        1 => return Ok(by_prefix[0]),
        0 => {}
        _ => {
            return Err(Lookup::Ambiguous(BudgetError::Ambiguous {
                query: query.to_string(),
                matches: by_prefix.iter().map(|i| name(*i).clone()).collect(),
            }))
        }
    }

    let by_id: Vec<&T> = items
        .iter()
        .filter(|i| id(*i).to_string().starts_with(&lower))
        .collect();
    match by_id.len() {
        1 => Ok(by_id[0]),
        0 => Err(Lookup::Missing),
        _ => Err(Lookup::Ambiguous(BudgetError::Ambiguous {
            query: query.to_string(),
            matches: by_id.iter().map(|i| name(*i).clone()).collect(),
        })),
    }
}

fn clean_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BudgetError::EmptyName.into());
    }
    if name.contains('/') {
        // '/' separates category and activity on the command line
        return Err(anyhow::anyhow!("Name must not contain '/': {}", name));
    }
    Ok(name.to_string())
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn check_budget(budget: f64) -> Result<()> {
    if !budget.is_finite() || budget < 0.0 {
        return Err(BudgetError::InvalidBudget(budget).into());
    }
    Ok(())
}

fn shifted_index(from: usize, delta: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (from as i64 + delta).clamp(0, len as i64 - 1) as usize
}

fn renumber(categories: &mut [Category]) {
    for (i, cat) in categories.iter_mut().enumerate() {
        cat.position = i;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::RefCell;

    /// In-memory repository shared by the service and use case tests.
    #[derive(Default)]
    pub(crate) struct MemCategoryRepo {
        pub categories: RefCell<Vec<Category>>,
    }

    impl CategoryRepository for MemCategoryRepo {
        fn list(&self) -> Result<Vec<Category>> {
            let mut all = self.categories.borrow().clone();
            all.sort_by_key(|c| c.position);
            Ok(all)
        }
        fn get(&self, id: &Uuid) -> Result<Category> {
            self.categories
                .borrow()
                .iter()
                .find(|c| c.id == *id)
                .cloned()
                .ok_or_else(|| anyhow!("missing"))
        }
        fn create(&self, category: Category) -> Result<Category> {
            self.categories.borrow_mut().push(category.clone());
            Ok(category)
        }
        fn update(&self, category: &Category) -> Result<()> {
            let mut all = self.categories.borrow_mut();
            let pos = all.iter().position(|c| c.id == category.id).ok_or_else(|| anyhow!("missing"))?;
            all[pos] = category.clone();
            Ok(())
        }
        fn delete(&self, id: &Uuid) -> Result<()> {
            self.categories.borrow_mut().retain(|c| c.id != *id);
            Ok(())
        }
        fn save_all(&self, categories: &[Category]) -> Result<()> {
            *self.categories.borrow_mut() = categories.to_vec();
            Ok(())
        }
    }

    fn service() -> BudgetService<MemCategoryRepo> {
        BudgetService::new(MemCategoryRepo::default())
    }

    #[test]
    fn test_add_category_rejects_duplicates() {
        let svc = service();
        svc.add_category("Work").unwrap();
        let err = svc.add_category(" work ").unwrap_err();
        assert_eq!(
            err.downcast_ref::<BudgetError>(),
            Some(&BudgetError::DuplicateName("work".to_string()))
        );
        assert!(svc.add_category("   ").is_err());
        assert!(svc.add_category("a/b").is_err());
    }

    #[test]
    fn test_activity_names_unique_within_category_only() {
        let svc = service();
        let work = svc.add_category("Work").unwrap();
        let home = svc.add_category("Home").unwrap();

        svc.add_subcategory(&work.id, "Admin", 2.0, None).unwrap();
        assert!(svc.add_subcategory(&work.id, "admin", 1.0, None).is_err());
        assert!(svc.add_subcategory(&home.id, "Admin", 1.0, None).is_ok());
    }

    #[test]
    fn test_negative_budget_rejected() {
        let svc = service();
        let work = svc.add_category("Work").unwrap();
        let err = svc.add_subcategory(&work.id, "Coding", -1.0, None).unwrap_err();
        assert_eq!(err.downcast_ref::<BudgetError>(), Some(&BudgetError::InvalidBudget(-1.0)));
    }

    #[test]
    fn test_update_subcategory() {
        let svc = service();
        let work = svc.add_category("Work").unwrap();
        let sub = svc.add_subcategory(&work.id, "Coding", 10.0, None).unwrap();

        let updated = svc
            .update_subcategory(
                &work.id,
                &sub.id,
                SubcategoryUpdate {
                    name: Some("Programming".to_string()),
                    budget: Some(12.0),
                    goal_direction: Some(Some(GoalDirection::MoreIsBetter)),
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Programming");
        assert_eq!(updated.budget, 12.0);
        assert_eq!(updated.goal_direction, Some(GoalDirection::MoreIsBetter));

        let reset = svc
            .update_subcategory(
                &work.id,
                &sub.id,
                SubcategoryUpdate { goal_direction: Some(None), ..Default::default() },
            )
            .unwrap();
        assert_eq!(reset.goal_direction, None);
        assert_eq!(reset.budget, 12.0);
    }

    #[test]
    fn test_move_category_clamps() {
        let svc = service();
        let a = svc.add_category("A").unwrap();
        svc.add_category("B").unwrap();
        svc.add_category("C").unwrap();

        assert_eq!(svc.move_category(&a.id, 1).unwrap(), 1);
        let names: Vec<String> = svc.list().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["B", "A", "C"]);

        assert_eq!(svc.move_category(&a.id, 10).unwrap(), 2);
        assert_eq!(svc.move_category(&a.id, -10).unwrap(), 0);
        let positions: Vec<usize> = svc.list().unwrap().into_iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_move_and_remove_subcategory_keep_positions_dense() {
        let svc = service();
        let work = svc.add_category("Work").unwrap();
        let a = svc.add_subcategory(&work.id, "A", 1.0, None).unwrap();
        let b = svc.add_subcategory(&work.id, "B", 1.0, None).unwrap();
        svc.add_subcategory(&work.id, "C", 1.0, None).unwrap();

        svc.move_subcategory(&work.id, &a.id, 2).unwrap();
        let cat = svc.get(&work.id).unwrap();
        let names: Vec<&str> = cat.subcategories.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);

        svc.remove_subcategory(&work.id, &b.id).unwrap();
        let cat = svc.get(&work.id).unwrap();
        let positions: Vec<usize> = cat.subcategories.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 1]);
    }

    #[test]
    fn test_remove_category_renumbers() {
        let svc = service();
        let a = svc.add_category("A").unwrap();
        svc.add_category("B").unwrap();
        svc.remove_category(&a.id).unwrap();
        let cats = svc.list().unwrap();
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].position, 0);
    }

    #[test]
    fn test_find_by_prefix_and_ambiguity() {
        let svc = service();
        svc.add_category("Work").unwrap();
        svc.add_category("Workout").unwrap();
        svc.add_category("Reading").unwrap();

        assert_eq!(svc.find_category("work").unwrap().name, "Work");
        assert_eq!(svc.find_category("rea").unwrap().name, "Reading");
        let err = svc.find_category("wo").unwrap_err();
        assert!(matches!(err.downcast_ref::<BudgetError>(), Some(BudgetError::Ambiguous { .. })));
        let err = svc.find_category("zzz").unwrap_err();
        assert!(matches!(err.downcast_ref::<BudgetError>(), Some(BudgetError::CategoryNotFound(_))));
    }

    #[test]
    fn test_resolve_path() {
        let svc = service();
        let work = svc.add_category("Work").unwrap();
        let sub = svc.add_subcategory(&work.id, "Coding", 10.0, None).unwrap();

        let (cat, found) = svc.resolve_path("wor/cod").unwrap();
        assert_eq!(cat.id, work.id);
        assert_eq!(found.id, sub.id);
        assert!(svc.resolve_path("Work").is_err());
        assert!(svc.resolve_path("Work/Nope").is_err());
    }

    #[test]
    fn test_apply_usage_resets_missing_to_zero() {
        let svc = service();
        let work = svc.add_category("Work").unwrap();
        let a = svc.add_subcategory(&work.id, "A", 5.0, None).unwrap();
        let b = svc.add_subcategory(&work.id, "B", 5.0, None).unwrap();

        let mut usage = HashMap::new();
        usage.insert(a.id, 2.5);
        usage.insert(b.id, 1.0);
        svc.apply_usage(&usage).unwrap();

        usage.remove(&b.id);
        svc.apply_usage(&usage).unwrap();

        let cat = svc.get(&work.id).unwrap();
        assert_eq!(cat.subcategory(&a.id).unwrap().time_used, 2.5);
        assert_eq!(cat.subcategory(&b.id).unwrap().time_used, 0.0);
    }
}
