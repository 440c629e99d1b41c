pub mod temples;
pub mod trip_plans;
