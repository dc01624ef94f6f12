// End to end tests that run SQL text through the conductor against an
// in-memory annotation store, checking acknowledgement lines, projected
// JSON rows and foreign-key splicing.

#[cfg(test)]
mod tests {
    use crate::Conductor;
    use annstore::storage_manager::StorageManager;
    use common::storage_trait::EntityStore;
    use common::AnnSqlError;

    fn conductor() -> Conductor<StorageManager> {
        Conductor::new(StorageManager::new_test_store())
    }

    fn seed_departments_and_users(conductor: &Conductor<StorageManager>) {
        let output = conductor
            .translate(
                "hr",
                "CREATE TABLE departments (dept_id TEXT, department_name TEXT, \
                 INDEX idx_dept_id (dept_id)); \
                 CREATE TABLE users (username TEXT, building TEXT, dept_id TEXT, \
                 CONSTRAINT fk__view_as__department_name FOREIGN KEY (dept_id) \
                 REFERENCES departments (dept_id)); \
                 INSERT INTO departments (dept_id, department_name) VALUES ('ACCT', 'Accounting'); \
                 INSERT INTO departments (dept_id, department_name) VALUES ('ENG', 'Engineering'); \
                 INSERT INTO users (username, building, dept_id) VALUES ('kim', 'West Wing', 'ACCT'); \
                 INSERT INTO users (username, building, dept_id) VALUES ('sam', 'East Wing', 'ENG');",
            )
            .unwrap();
        assert_eq!(
            vec![
                String::from("TABLE CREATED: departments"),
                String::from("TABLE CREATED: users"),
                String::from("DATA INSERTED: departments"),
                String::from("DATA INSERTED: departments"),
                String::from("DATA INSERTED: users"),
                String::from("DATA INSERTED: users"),
            ],
            output
        );
    }

    #[test]
    fn test_select_with_fk_splice() {
        let conductor = conductor();
        seed_departments_and_users(&conductor);
        let output = conductor
            .translate(
                "hr",
                "SELECT username, dept_id FROM users WHERE building = 'West Wing'",
            )
            .unwrap();
        assert_eq!(
            vec![String::from(
                "{\"app\":\"hr\",\"type\":\"tabledata\",\"tablename\":\"users\",\
                 \"username\":\"kim\",\"dept_id\":\"ACCT\",\
                 \"department_name\":\"Accounting\"}"
            )],
            output
        );
    }

    #[test]
    fn test_select_wildcard_returns_whole_rows() {
        let conductor = conductor();
        seed_departments_and_users(&conductor);
        let output = conductor
            .translate("hr", "SELECT * FROM departments WHERE dept_id = 'ENG'")
            .unwrap();
        assert_eq!(
            vec![String::from(
                "{\"app\":\"hr\",\"type\":\"tabledata\",\"tablename\":\"departments\",\
                 \"dept_id\":\"ENG\",\"department_name\":\"Engineering\"}"
            )],
            output
        );
    }

    #[test]
    fn test_create_then_empty_select_yields_only_the_ack() {
        let conductor = conductor();
        let output = conductor
            .translate("hr", "CREATE TABLE t (a INTEGER); SELECT a FROM t;")
            .unwrap();
        assert_eq!(vec![String::from("TABLE CREATED: t")], output);
    }

    #[test]
    fn test_numeric_predicate_end_to_end() {
        let conductor = conductor();
        conductor
            .translate(
                "hr",
                "CREATE TABLE people (username TEXT, age INTEGER); \
                 INSERT INTO people (username, age) VALUES ('kim', 30); \
                 INSERT INTO people (username, age) VALUES ('sam', 40);",
            )
            .unwrap();
        let output = conductor
            .translate("hr", "SELECT username FROM people WHERE age > 35")
            .unwrap();
        assert_eq!(
            vec![String::from(
                "{\"app\":\"hr\",\"type\":\"tabledata\",\"tablename\":\"people\",\
                 \"username\":\"sam\"}"
            )],
            output
        );
    }

    #[test]
    fn test_rows_come_back_in_insertion_order() {
        let conductor = conductor();
        seed_departments_and_users(&conductor);
        let output = conductor
            .translate("hr", "SELECT username FROM users")
            .unwrap();
        assert_eq!(2, output.len());
        assert!(output[0].contains("\"username\":\"kim\""));
        assert!(output[1].contains("\"username\":\"sam\""));
    }

    #[test]
    fn test_app_namespaces_are_isolated() {
        let conductor = conductor();
        seed_departments_and_users(&conductor);
        let output = conductor
            .translate("other_app", "SELECT username FROM users")
            .unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_normalize_error_aborts_before_any_write() {
        let conductor = conductor();
        let err = conductor
            .translate(
                "hr",
                "CREATE TABLE t (a INTEGER); CREATE TABLE u (tablename TEXT);",
            )
            .unwrap_err();
        assert!(matches!(err, AnnSqlError::ReservedIdentifier(_)));
        // Normalization is all or nothing, so even the valid first
        // statement must not have reached the store.
        assert!(conductor
            .store()
            .query_entities("app=\"hr\"")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_executed_batches_stay_executed_on_later_error() {
        let conductor = conductor();
        let err = conductor
            .translate(
                "hr",
                "CREATE TABLE t (a INTEGER); INSERT INTO t (a) VALUES (1); \
                 SELECT a FROM t WHERE a <> 1;",
            )
            .unwrap_err();
        // The unmapped operator passes through to the store, which rejects
        // the filter at query time, after the write batch went through.
        assert!(matches!(err, AnnSqlError::ExecutionError(_)));
        assert_eq!(
            2,
            conductor.store().query_entities("app=\"hr\"").unwrap().len()
        );
    }
}
