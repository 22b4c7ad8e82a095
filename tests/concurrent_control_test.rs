// ==========================================
// 并发控制测试
// ==========================================
// 职责: 多线程共享同一存储时, 不同模具的操作互不干扰,
//       同一模具的竞争领用每次成功都对应一条履历
// ==========================================


#[cfg(test)]
mod concurrent_control_test {
    use mold_manager::api::{ApiError, MoldApi};
    use mold_manager::db::open_sqlite_connection;
    use mold_manager::domain::types::{MoldStatus, TransitionPolicy};
    use mold_manager::repository::{InMemoryMoldStore, MoldRepository, MoldStore};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use tempfile::NamedTempFile;

    use crate::test_helpers::create_test_db;

    // ==========================================
    // 测试辅助函数
    // ==========================================

    fn setup_sqlite_api() -> (NamedTempFile, Arc<MoldApi>) {
        let (temp_file, db_path) = create_test_db().unwrap();
        let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path).unwrap()));
        let store: Arc<dyn MoldStore> = Arc::new(MoldRepository::from_connection(conn));
        (
            temp_file,
            Arc::new(MoldApi::new(store, TransitionPolicy::Strict)),
        )
    }

    /// 每个线程操作自己的模具: 建档 -> 领用 -> 归还
    fn run_disjoint_workers(api: Arc<MoldApi>, workers: usize) {
        let handles: Vec<_> = (0..workers)
            .map(|i| {
                let api = Arc::clone(&api);
                thread::spawn(move || {
                    let suffix = format!("T{}", i);
                    let mold = api.create("INJ", &suffix, "Worker Mold", 100).unwrap();
                    api.checkout(&mold.mold_id, &format!("op{}", i), "M1").unwrap();
                    api.return_mold(&mold.mold_id, i as i64).unwrap();
                    mold.mold_id
                })
            })
            .collect();

        for handle in handles {
            let mold_id = handle.join().unwrap();
            let mold = api.get_mold(&mold_id).unwrap().unwrap();
            assert_eq!(mold.status(), MoldStatus::Available);
        }

        assert_eq!(api.list_molds(None).unwrap().len(), workers);
        assert_eq!(api.list_logs().unwrap().len(), workers * 3);

        for i in 0..workers {
            let mold = api.get_mold(&format!("INJ-T{}", i)).unwrap().unwrap();
            assert_eq!(mold.current_shots, i as i64);
            assert_eq!(api.list_logs_by_mold(&mold.mold_id).unwrap().len(), 3);
        }
    }

    /// 多线程争抢同一模具的领用
    fn run_contended_checkout(api: Arc<MoldApi>, workers: usize) {
        api.create("INJ", "HOT", "Shared Mold", 100).unwrap();

        let handles: Vec<_> = (0..workers)
            .map(|i| {
                let api = Arc::clone(&api);
                thread::spawn(move || api.checkout("INJ-HOT", &format!("op{}", i), "M1"))
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            match handle.join().unwrap() {
                Ok(outcome) => {
                    assert!(outcome.is_applied());
                    succeeded += 1;
                }
                Err(ApiError::InvalidTransition { .. }) => {}
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        // 读-判-写非原子, 多个线程可能都读到 available;
        // 但每次成功的领用都恰好对应一条履历
        assert!(succeeded >= 1);
        let logs = api.list_logs_by_mold("INJ-HOT").unwrap();
        assert_eq!(logs.len(), 1 + succeeded);

        let mold = api.get_mold("INJ-HOT").unwrap().unwrap();
        assert_eq!(mold.status(), MoldStatus::InUse);
    }

    // ==========================================
    // 测试用例
    // ==========================================

    #[test]
    fn test_disjoint_molds_sqlite() {
        let (_temp_file, api) = setup_sqlite_api();
        run_disjoint_workers(api, 8);
    }

    #[test]
    fn test_disjoint_molds_memory() {
        let api = Arc::new(MoldApi::new(
            Arc::new(InMemoryMoldStore::new()),
            TransitionPolicy::Strict,
        ));
        run_disjoint_workers(api, 8);
    }

    #[test]
    fn test_contended_checkout_sqlite() {
        let (_temp_file, api) = setup_sqlite_api();
        run_contended_checkout(api, 6);
    }

    #[test]
    fn test_contended_checkout_memory() {
        let api = Arc::new(MoldApi::new(
            Arc::new(InMemoryMoldStore::new()),
            TransitionPolicy::Strict,
        ));
        run_contended_checkout(api, 6);
    }
}
